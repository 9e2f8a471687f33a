//! Builder-pattern printer for rendering errors against their source.

use std::fmt::Write;
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use crate::Error;

/// Renders an [`Error`] as an annotated snippet of the template it was
/// raised in. Without a source, or for errors without a position, the
/// error renders as a single line.
///
/// For errors wrapped by [`Error::InTemplate`], the source and path should be
/// those of the innermost template (see [`Error::innermost`]).
pub struct ErrorPrinter<'e, 's> {
    error: &'e Error,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'e, 's> ErrorPrinter<'e, 's> {
    pub fn new(error: &'e Error) -> Self {
        Self {
            error,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let (_, inner) = self.error.innermost();
        let Some(source) = self.source else {
            return self.format_plain(w);
        };
        let Some(range) = error_range(inner, source) else {
            return self.format_plain(w);
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let label = annotation_label(inner);
        let mut annotation = AnnotationKind::Primary.span(range);
        if let Some(label) = &label {
            annotation = annotation.label(label);
        }
        let mut snippet = Snippet::source(source).line_start(1).annotation(annotation);
        if let Some(p) = self.path {
            snippet = snippet.path(p);
        }

        let title = headline(inner);
        let report = vec![Level::ERROR.primary_title(&title).element(snippet)];
        write!(w, "{}", renderer.render(&report))
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        write!(w, "error: {}", self.error)
    }
}

impl Error {
    pub fn printer(&self) -> ErrorPrinter<'_, '_> {
        ErrorPrinter::new(self)
    }
}

/// The message without its line prefix; the snippet shows the line.
fn headline(err: &Error) -> String {
    match err {
        Error::Syntax { message, .. } | Error::InvalidExpression { message, .. } => message.clone(),
        Error::UnexpectedExpression {
            expected, actual, ..
        } => format!("expected {expected}, found {actual}"),
        Error::UnsupportedConstruct { kind, name, .. } => format!("unsupported {kind} `{name}`"),
        other => other.to_string(),
    }
}

fn annotation_label(err: &Error) -> Option<String> {
    match err {
        Error::UnexpectedExpression { actual, .. } => Some(format!("this is {}", actual.kind_name())),
        Error::MergeConflict(conflict) => Some(format!(
            "used as {} and as {}",
            conflict.left.kind_name(),
            conflict.right.kind_name()
        )),
        _ => None,
    }
}

/// Byte range to underline: the syntax error's span, or the trimmed source
/// line of errors that only know their line.
fn error_range(err: &Error, source: &str) -> Option<Range<usize>> {
    if let Error::Syntax { span, .. } = err {
        return Some(adjust_range(span.clone(), source.len()));
    }
    let line = err.line()?;
    line_range(source, line)
}

fn line_range(source: &str, line: u32) -> Option<Range<usize>> {
    let index = usize::try_from(line).ok()?.checked_sub(1)?;
    let mut offset = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i == index {
            let content = text.trim_end_matches(['\n', '\r']);
            let trimmed = content.trim_start();
            let start = offset + (content.len() - trimmed.len());
            let end = offset + content.trim_end().len();
            return Some(adjust_range(start..end.max(start), source.len()));
        }
        offset += text.len();
    }
    None
}

fn adjust_range(range: Range<usize>, limit: usize) -> Range<usize> {
    if range.start == range.end {
        return range.start..(range.start + 1).min(limit);
    }
    range
}
