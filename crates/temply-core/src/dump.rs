//! Indented tree rendering of inferred requirements.
//!
//! One line per node: `name: kind`, with `?` after names that are not required.
//! Children follow at two extra spaces: dictionary entries by key, list items as
//! `[]`, map values as `[*]`, tuple positions as `[N]` and union members as `|`.

use std::fmt::Write as _;

use crate::Colors;
use crate::variable::{Shape, Variable};

/// Render a top-level requirement dictionary (or any other shape) as a tree.
pub fn dump(root: &Variable, colors: Colors) -> String {
    let mut out = String::new();
    match &root.shape {
        Shape::Dictionary(entries) => {
            for (name, var) in entries {
                write_node(&mut out, name, var, true, 0, colors);
            }
        }
        _ => write_node(&mut out, "$", root, false, 0, colors),
    }
    out
}

fn write_node(
    out: &mut String,
    name: &str,
    var: &Variable,
    entry: bool,
    depth: usize,
    c: Colors,
) {
    let optional = if entry && !var.is_required() { "?" } else { "" };
    let _ = write!(
        out,
        "{:indent$}{}{name}{}{optional}: {}",
        "",
        c.blue,
        c.reset,
        var.kind_name(),
        indent = depth * 2
    );
    if let Some(value) = &var.meta.value {
        let _ = write!(out, " {}= {value}{}", c.green, c.reset);
    }
    out.push('\n');

    match &var.shape {
        Shape::Unknown | Shape::Scalar(_) => {}
        Shape::Dictionary(entries) => {
            for (key, child) in entries {
                write_node(out, key, child, true, depth + 1, c);
            }
        }
        Shape::List(item) => write_marker(out, "[]", item, depth + 1, c),
        Shape::AdditionalProperties(item) => write_marker(out, "[*]", item, depth + 1, c),
        Shape::Tuple(items) => {
            for (i, item) in items.iter().enumerate() {
                write_marker(out, &format!("[{i}]"), item, depth + 1, c);
            }
        }
        Shape::AnyOf(members) => {
            for member in members {
                write_marker(out, "|", member, depth + 1, c);
            }
        }
    }
}

fn write_marker(out: &mut String, marker: &str, var: &Variable, depth: usize, c: Colors) {
    let dimmed = format!("{}{marker}{}", c.dim, c.reset);
    write_node(out, &dimmed, var, false, depth, c);
}
