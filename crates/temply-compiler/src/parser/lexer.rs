//! Two-mode lexer for the template language.
//!
//! Outside delimiters the source is raw data. Inside `{{ … }}` and `{% … %}`
//! tokens come from a Logos lexer that runs until the closing delimiter.
//! Comments are dropped, `{% raw %}` bodies become data, and a `-` next to a
//! delimiter strips the whitespace on that side.
//!
//! Tokens are span-based; text is sliced from the source when needed.

use std::ops::Range;

use logos::Logos;

use crate::{Error, Result};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TokenKind {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name,
    #[regex(r"[0-9][0-9_]*")]
    Integer,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+")]
    Float,
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    #[token("+")]
    Add,
    #[token("-")]
    Sub,
    #[token("*")]
    Mul,
    #[token("/")]
    Div,
    #[token("//")]
    FloorDiv,
    #[token("%")]
    Mod,
    #[token("**")]
    Pow,
    #[token("~")]
    Tilde,
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("=")]
    Assign,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("|")]
    Pipe,

    /// Raw text between tags.
    Data,
    /// `{{`
    VariableBegin,
    /// `}}`
    VariableEnd,
    /// `{%`
    BlockBegin,
    /// `%}`
    BlockEnd,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Name => "name",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::Add => "`+`",
            TokenKind::Sub => "`-`",
            TokenKind::Mul => "`*`",
            TokenKind::Div => "`/`",
            TokenKind::FloorDiv => "`//`",
            TokenKind::Mod => "`%`",
            TokenKind::Pow => "`**`",
            TokenKind::Tilde => "`~`",
            TokenKind::Eq => "`==`",
            TokenKind::Ne => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Assign => "`=`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Colon => "`:`",
            TokenKind::Pipe => "`|`",
            TokenKind::Data => "template data",
            TokenKind::VariableBegin => "`{{`",
            TokenKind::VariableEnd => "`}}`",
            TokenKind::BlockBegin => "`{%`",
            TokenKind::BlockEnd => "`%}`",
        }
    }
}

/// Zero-copy token: kind + byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }
}

/// Text of a token. O(1) slice into source.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[token.span.clone()]
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let newlines = source
            .bytes()
            .enumerate()
            .filter_map(|(i, b)| (b == b'\n').then_some(i))
            .collect();
        Self { newlines }
    }

    pub fn line(&self, offset: usize) -> u32 {
        (self.newlines.partition_point(|&nl| nl < offset) + 1) as u32
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tag {
    Variable,
    Block,
}

impl Tag {
    fn close(self) -> &'static str {
        match self {
            Tag::Variable => "}}",
            Tag::Block => "%}",
        }
    }
}

/// Tokenizes a template.
pub fn lex(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'s> {
    source: &'s str,
    lines: LineIndex,
    pos: usize,
    tokens: Vec<Token>,
    /// Strip leading whitespace from the next data run.
    trim_next: bool,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            pos: 0,
            tokens: Vec::new(),
            trim_next: false,
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while self.pos < self.source.len() {
            let Some((open, marker)) = self.find_open(self.pos) else {
                self.push_data(self.pos, self.source.len(), false);
                break;
            };

            let trim_before = self.source[open + 2..].starts_with('-');
            self.push_data(self.pos, open, trim_before);
            let inner = open + 2 + usize::from(trim_before);

            match marker {
                b'#' => self.comment(open, inner)?,
                b'{' => self.tag(open, inner, Tag::Variable)?,
                _ => self.tag(open, inner, Tag::Block)?,
            }
        }
        Ok(self.tokens)
    }

    fn find_open(&self, from: usize) -> Option<(usize, u8)> {
        let bytes = self.source.as_bytes();
        self.source[from..].match_indices('{').find_map(|(i, _)| {
            let at = from + i;
            match bytes.get(at + 1) {
                Some(&m @ (b'{' | b'%' | b'#')) => Some((at, m)),
                _ => None,
            }
        })
    }

    fn push_data(&mut self, start: usize, end: usize, trim_end: bool) {
        let mut text = &self.source[start..end];
        let mut start = start;
        if std::mem::take(&mut self.trim_next) {
            let trimmed = text.trim_start();
            start += text.len() - trimmed.len();
            text = trimmed;
        }
        if trim_end {
            text = text.trim_end();
        }
        if !text.is_empty() {
            self.tokens
                .push(Token::new(TokenKind::Data, start..start + text.len()));
        }
    }

    fn comment(&mut self, open: usize, inner: usize) -> Result<()> {
        let Some(close) = self.source[inner..].find("#}").map(|i| inner + i) else {
            return Err(self.error("unclosed comment", open..open + 2));
        };
        self.trim_next = close > inner && self.source.as_bytes()[close - 1] == b'-';
        self.pos = close + 2;
        Ok(())
    }

    fn tag(&mut self, open: usize, inner: usize, tag: Tag) -> Result<()> {
        let begin = match tag {
            Tag::Variable => TokenKind::VariableBegin,
            Tag::Block => TokenKind::BlockBegin,
        };
        let first = self.tokens.len();
        self.tokens.push(Token::new(begin, open..inner));

        let source = self.source;
        let mut lexer = TokenKind::lexer(&source[inner..]);
        let mut depth = 0usize;
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let (start, end) = (inner + span.start, inner + span.end);
            let kind = result.map_err(|()| {
                let found = &source[start..end];
                self.error(&format!("unexpected character `{found}`"), start..end)
            })?;
            let rest = &source[end..];

            let closing = match kind {
                TokenKind::Sub if depth == 0 && rest.starts_with(tag.close()) => {
                    Some((end + 2, true))
                }
                TokenKind::RBrace if tag == Tag::Variable && depth == 0 && rest.starts_with('}') => {
                    Some((end + 1, false))
                }
                TokenKind::Mod if tag == Tag::Block && rest.starts_with('}') => {
                    Some((end + 1, false))
                }
                _ => None,
            };
            if let Some((close_end, trim_after)) = closing {
                return self.close_tag(tag, first, start..close_end, trim_after);
            }

            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.tokens.push(Token::new(kind, start..end));
        }

        let message = format!("unclosed tag, expected `{}`", tag.close());
        Err(self.error(&message, open..inner))
    }

    fn close_tag(
        &mut self,
        tag: Tag,
        first: usize,
        span: Range<usize>,
        trim_after: bool,
    ) -> Result<()> {
        let end = match tag {
            Tag::Variable => TokenKind::VariableEnd,
            Tag::Block => TokenKind::BlockEnd,
        };
        self.pos = span.end;
        self.trim_next = trim_after;
        self.tokens.push(Token::new(end, span));

        if tag == Tag::Block && self.is_raw(first) {
            let open = self.tokens[first].span.clone();
            self.tokens.truncate(first);
            return self.raw(open);
        }
        Ok(())
    }

    /// `{% raw %}`: the tag holds exactly one name, `raw`.
    fn is_raw(&self, first: usize) -> bool {
        match &self.tokens[first..] {
            [_, name, _] => name.kind == TokenKind::Name && token_text(self.source, name) == "raw",
            _ => false,
        }
    }

    fn raw(&mut self, open: Range<usize>) -> Result<()> {
        let Some((start, end, trim_before, trim_after)) = self.find_endraw(self.pos) else {
            return Err(self.error("unclosed `raw` block, expected `{% endraw %}`", open));
        };
        self.push_data(self.pos, start, trim_before);
        self.pos = end;
        self.trim_next = trim_after;
        Ok(())
    }

    fn find_endraw(&self, from: usize) -> Option<(usize, usize, bool, bool)> {
        self.source[from..].match_indices("{%").find_map(|(i, _)| {
            let start = from + i;
            let mut rest = &self.source[start + 2..];
            let trim_before = rest.starts_with('-');
            if trim_before {
                rest = &rest[1..];
            }
            let rest = rest.trim_start().strip_prefix("endraw")?.trim_start();
            let (trim_after, rest) = match rest.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, rest),
            };
            rest.strip_prefix("%}")?;
            let end = self.source.len() - rest.len() + 2;
            Some((start, end, trim_before, trim_after))
        })
    }

    fn error(&self, message: &str, span: Range<usize>) -> Error {
        Error::Syntax {
            message: message.to_string(),
            line: self.lines.line(span.start),
            span,
        }
    }
}
