#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shape model for template inference.
//!
//! - [`variable`]: the inferred shape of a value plus its bookkeeping
//! - [`merge`]: the lattice that reconciles two observations of one value
//! - [`schema`]: JSON-Schema emission with `$defs`
//! - [`sample`]: example payloads generated from a schema

pub mod merge;
pub mod sample;
pub mod schema;
pub mod utils;
pub mod variable;

mod colors;
mod dump;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod merge_tests;
#[cfg(test)]
mod utils_tests;
#[cfg(test)]
mod variable_tests;

pub use colors::Colors;
pub use dump::dump;
pub use merge::{
    Combiner, MergeConflict, alternatives, merge, merge_all, merge_branches, merge_rtypes, merge_with,
};
pub use sample::{SampleConfig, SampleError, generate_object, generate_object_with};
pub use schema::{PropertyOrder, SchemaConfig, SchemaMode, to_json_schema, to_json_schema_modes};
pub use variable::{Literal, Meta, ScalarKind, Shape, Variable};
