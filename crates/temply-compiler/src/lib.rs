//! temply compiler: template parser and structural schema inference.
//!
//! This crate turns notification templates into requirement trees:
//! - `parser` - two-mode lexer and recursive-descent parser to a closed AST
//! - `infer` - statement and expression visitors producing requirements
//! - `loader` - template sources and the parsed-template cache
//! - `workspace` - templates, layouts and partials on disk
//! - `metadata` - the optional header comment of a template
//! - `diagnostics` - error rendering with source snippets

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod diagnostics;
pub mod infer;
pub mod loader;
pub mod metadata;
pub mod parser;
pub mod workspace;

mod engine;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod diagnostics_tests;
#[cfg(test)]
mod loader_tests;
#[cfg(test)]
mod metadata_tests;
#[cfg(test)]
mod workspace_tests;

use std::ops::Range;
use std::path::PathBuf;

use temply_core::{MergeConflict, SampleError, Variable};

pub use config::InferConfig;
pub use diagnostics::ErrorPrinter;
pub use engine::Engine;
pub use infer::{Inference, Macro, MacroEntry, MacroTable};
pub use loader::{FileSystemLoader, Loader, MemoryLoader};
pub use metadata::Metadata;
pub use parser::{Template, parse};
pub use workspace::Workspace;

/// Errors raised while loading, parsing or inferring templates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    MergeConflict(#[from] MergeConflict),

    #[error(transparent)]
    Sample(#[from] SampleError),

    /// The shape predicted at this position does not accept the expression.
    #[error("line {line}: expected {expected}, found {actual}")]
    UnexpectedExpression {
        expected: Box<Variable>,
        actual: Box<Variable>,
        line: u32,
    },

    #[error("line {line}: unsupported {kind} `{name}`")]
    UnsupportedConstruct {
        kind: &'static str,
        name: String,
        line: u32,
    },

    /// Malformed macro call or `dict(...)` arguments.
    #[error("line {line}: {message}")]
    InvalidExpression { message: String, line: u32 },

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("cyclic reference to {path}: {}", chain.join(" -> "))]
    CyclicReference { path: String, chain: Vec<String> },

    #[error("line {line}: {message}")]
    Syntax {
        message: String,
        line: u32,
        span: Range<usize>,
    },

    /// Input nested too deeply.
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("not a template workspace: {} is missing", .0.display())]
    MissingDirectory(PathBuf),

    /// A template or component name that is not a single path segment.
    #[error("invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An error raised while processing a referenced template.
    #[error("in {template}: {source}")]
    InTemplate {
        template: String,
        source: Box<Error>,
    },
}

impl Error {
    /// Source line the error points at, in the innermost template.
    pub fn line(&self) -> Option<u32> {
        match self {
            Error::MergeConflict(conflict) => conflict.line(),
            Error::UnexpectedExpression { line, .. }
            | Error::UnsupportedConstruct { line, .. }
            | Error::InvalidExpression { line, .. }
            | Error::Syntax { line, .. } => Some(*line),
            Error::InTemplate { source, .. } => source.line(),
            _ => None,
        }
    }

    /// Follows `InTemplate` wrappers down to the error that was raised, along
    /// with the template it was raised in (`None` for the outermost one).
    pub fn innermost(&self) -> (Option<&str>, &Error) {
        let mut template = None;
        let mut current = self;
        while let Error::InTemplate {
            template: name,
            source,
        } = current
        {
            template = Some(name.as_str());
            current = &**source;
        }
        (template, current)
    }

    pub(crate) fn in_template(self, template: &str) -> Self {
        Error::InTemplate {
            template: template.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
