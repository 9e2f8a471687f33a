//! Parser state and low-level token operations.

use std::ops::Range;

use super::ast::Template;
use super::lexer::{LineIndex, Token, TokenKind, token_text};
use crate::config::DEFAULT_RECURSION_LIMIT;
use crate::{Error, Result};

pub struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    lines: LineIndex,
    depth: u32,
    recursion_limit: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            lines: LineIndex::new(source),
            depth: 0,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn parse(mut self) -> Result<Template> {
        let (body, _) = self.parse_body(&[])?;
        Ok(Template { body })
    }

    pub(super) fn current(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    pub(super) fn nth(&self, lookahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + lookahead).map(|t| t.kind)
    }

    pub(super) fn currently_is(&self, kind: TokenKind) -> bool {
        self.current() == Some(kind)
    }

    pub(super) fn current_text(&self) -> &'src str {
        self.nth_text(0)
    }

    /// Text of the token `lookahead` positions ahead; empty past the end.
    pub(super) fn nth_text(&self, lookahead: usize) -> &'src str {
        self.tokens
            .get(self.pos + lookahead)
            .map_or("", |t| token_text(self.source, t))
    }

    pub(super) fn current_span(&self) -> Range<usize> {
        match self.tokens.get(self.pos) {
            Some(token) => token.span.clone(),
            None => self.source.len()..self.source.len(),
        }
    }

    /// Line of the current token, or of the last one at end of input.
    pub(super) fn line(&self) -> u32 {
        let offset = match self.tokens.get(self.pos).or(self.tokens.last()) {
            Some(token) => token.span.start,
            None => 0,
        };
        self.lines.line(offset)
    }

    pub(super) fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.currently_is(kind) {
            self.pos += 1;
            return true;
        }
        false
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.currently_is(kind) {
            return Ok(self.bump());
        }
        Err(self.unexpected(kind.describe()))
    }

    /// Current token is the name `keyword`.
    pub(super) fn at_keyword(&self, keyword: &str) -> bool {
        self.currently_is(TokenKind::Name) && self.current_text() == keyword
    }

    pub(super) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            return true;
        }
        false
    }

    pub(super) fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            return Ok(());
        }
        Err(self.unexpected(&format!("`{keyword}`")))
    }

    pub(super) fn expect_ident(&mut self) -> Result<String> {
        let token = self.expect(TokenKind::Name)?;
        Ok(token_text(self.source, &token).to_string())
    }

    pub(super) fn enter_recursion(&mut self) -> Result<()> {
        if self.depth >= self.recursion_limit {
            return Err(Error::RecursionLimitExceeded);
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(super) fn error_at(&self, message: impl Into<String>, span: Range<usize>) -> Error {
        Error::Syntax {
            message: message.into(),
            line: self.lines.line(span.start),
            span,
        }
    }

    pub(super) fn error_here(&self, message: impl Into<String>) -> Error {
        self.error_at(message, self.current_span())
    }

    pub(super) fn unexpected(&self, expected: &str) -> Error {
        let found = match self.current() {
            None => "end of template".to_string(),
            Some(TokenKind::Name) => format!("`{}`", self.current_text()),
            Some(kind) => kind.describe().to_string(),
        };
        self.error_here(format!("expected {expected}, found {found}"))
    }
}
