pub mod check;
pub mod deps;
pub mod list;
pub mod sample;
pub mod schema;
pub mod target;

#[cfg(test)]
mod check_tests;
#[cfg(test)]
mod deps_tests;
#[cfg(test)]
mod test_utils;

use std::path::Path;

use serde_json::Value;
use temply_compiler::{InferConfig, Workspace};

use target::Target;

/// Opens the target of a command, exiting on failure.
pub fn open_target(path: &Path, config: InferConfig) -> Target {
    Target::open(path, config).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(1);
    })
}

/// Opens a workspace root, exiting on failure.
pub fn open_workspace(root: &Path) -> Workspace {
    Workspace::open(root).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(1);
    })
}

pub fn print_json(value: &Value, compact: bool) {
    let text = if compact {
        value.to_string()
    } else {
        serde_json::to_string_pretty(value).expect("JSON values always serialize")
    };
    println!("{text}");
}
