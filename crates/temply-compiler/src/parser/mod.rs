//! Parser for the template language.
//!
//! # Architecture
//!
//! - Two-mode lexing: raw data outside delimiters, Logos tokens inside
//! - Zero-copy tokens: spans only, text sliced while building nodes
//! - Recursive descent straight to a closed AST, one function per production
//! - Fail-fast: the first syntax error aborts with its byte span
//!
//! Nesting is bounded by a recursion limit; exceeding it is
//! [`Error::RecursionLimitExceeded`](crate::Error::RecursionLimitExceeded).

pub mod ast;
pub mod lexer;

mod core;
mod expressions;
mod statements;

#[cfg(test)]
mod lexer_tests;

pub use ast::{
    Args, BinOp, CmpOp, Expr, Keyword, Params, Stmt, Target, Template, UnaryOp,
};
pub use core::Parser;

use crate::Result;
use lexer::lex;

/// Parse with the default recursion limit.
pub fn parse(source: &str) -> Result<Template> {
    Parser::new(source, lex(source)?).parse()
}

pub fn parse_with_limit(source: &str, recursion_limit: u32) -> Result<Template> {
    Parser::new(source, lex(source)?)
        .with_recursion_limit(recursion_limit)
        .parse()
}
