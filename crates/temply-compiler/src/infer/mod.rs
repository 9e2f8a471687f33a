//! Structural inference over the template AST.
//!
//! Visitors walk statements and expressions with a predicted shape and return
//! the requirements each node places on the render context. Expression
//! visitors also return the shape of the value the expression produces.

mod calls;
mod context;
mod expr;
mod filters;
mod macros;
mod stmt;

#[cfg(test)]
mod calls_tests;
#[cfg(test)]
mod macros_tests;

pub(crate) use context::Context;
pub use macros::{Macro, MacroEntry, MacroTable};

use temply_core::Variable;

/// What a template needs from its context, and the macros it defines.
#[derive(Debug, Clone)]
pub struct Inference {
    /// Top-level dictionary of context names.
    pub requirements: Variable,
    pub macros: MacroTable,
}
