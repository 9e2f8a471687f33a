//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so the same definition can be
//! composed into several commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Workspace root or single template file (positional).
pub fn path_arg() -> Arg {
    Arg::new("path")
        .value_name("PATH")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Workspace root or template file")
}

/// Workspace root (positional).
pub fn root_arg() -> Arg {
    Arg::new("path")
        .value_name("ROOT")
        .default_value(".")
        .value_parser(value_parser!(PathBuf))
        .help("Workspace root")
}

/// Template directory name inside the workspace (positional).
pub fn template_arg() -> Arg {
    Arg::new("template")
        .value_name("TEMPLATE")
        .help("Template name (required when PATH is a workspace)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Verbosity (-v, repeatable).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .global(true)
        .help("Log more (-v info, -vv debug, -vvv trace)")
}

/// Extra filters whose output is a string (--string-filter).
pub fn string_filter_arg() -> Arg {
    Arg::new("string_filter")
        .long("string-filter")
        .value_name("NAME")
        .action(ArgAction::Append)
        .value_delimiter(',')
        .help("Treat a custom filter as string-valued (repeatable)")
}

/// Schema side (--mode).
pub fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .value_name("MODE")
        .default_value("input")
        .value_parser(["input", "output"])
        .help("Describe what the template consumes (input) or what callers send (output)")
}

/// Suffix definition names with the mode (--tag-modes).
pub fn tag_modes_arg() -> Arg {
    Arg::new("tag_modes")
        .long("tag-modes")
        .action(ArgAction::SetTrue)
        .help("Suffix $defs names with -Input/-Output")
}

/// Root title (--title).
pub fn title_arg() -> Arg {
    Arg::new("title")
        .long("title")
        .value_name("TITLE")
        .help("Title of the root schema object")
}

/// Property order (--order).
pub fn order_arg() -> Arg {
    Arg::new("order")
        .long("order")
        .value_name("ORDER")
        .default_value("alphabetical")
        .value_parser(["alphabetical", "first-seen"])
        .help("Order of schema properties")
}

/// Compact JSON output (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Print JSON on a single line")
}

/// Sample seed (--seed).
pub fn seed_arg() -> Arg {
    Arg::new("seed")
        .long("seed")
        .value_name("N")
        .default_value("0")
        .value_parser(value_parser!(u64))
        .help("Seed for generated values")
}

/// Sample array length (--array-len).
pub fn array_len_arg() -> Arg {
    Arg::new("array_len")
        .long("array-len")
        .value_name("N")
        .default_value("2")
        .value_parser(value_parser!(usize))
        .help("Number of items in generated arrays")
}

/// Print requirement trees (--tree).
pub fn tree_arg() -> Arg {
    Arg::new("tree")
        .long("tree")
        .action(ArgAction::SetTrue)
        .help("Print the inferred requirement tree")
}

/// Print import statements instead of dependencies (--imports).
pub fn imports_arg() -> Arg {
    Arg::new("imports")
        .long("imports")
        .action(ArgAction::SetTrue)
        .help("Print the import statement for each partial")
}
