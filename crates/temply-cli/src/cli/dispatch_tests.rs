//! Tests for CLI dispatch: flag parsing and params extraction.

use std::path::PathBuf;

use temply_core::{PropertyOrder, SchemaMode};

use super::*;
use crate::cli::commands::{check_command, deps_command, list_command, sample_command, schema_command};

#[test]
fn cli_definition_is_valid() {
    build_cli().debug_assert();
}

#[test]
fn schema_defaults() {
    let m = schema_command()
        .try_get_matches_from(["schema", "."])
        .unwrap();
    let params = SchemaParams::from_matches(&m);

    assert_eq!(params.path, PathBuf::from("."));
    assert_eq!(params.template, None);
    assert_eq!(params.mode, SchemaMode::Input);
    assert_eq!(params.order, PropertyOrder::Alphabetical);
    assert!(!params.tag_modes);
    assert!(params.string_filters.is_empty());
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn schema_flags() {
    let m = schema_command()
        .try_get_matches_from([
            "schema",
            "site",
            "order",
            "--mode",
            "output",
            "--tag-modes",
            "--order",
            "first-seen",
            "--title",
            "Order",
            "--string-filter",
            "slugify,money",
            "--string-filter",
            "nl2br",
            "--color",
            "never",
        ])
        .unwrap();
    let params = SchemaParams::from_matches(&m);

    assert_eq!(params.path, PathBuf::from("site"));
    assert_eq!(params.template.as_deref(), Some("order"));
    assert_eq!(params.mode, SchemaMode::Output);
    assert_eq!(params.order, PropertyOrder::FirstSeen);
    assert!(params.tag_modes);
    assert_eq!(params.title.as_deref(), Some("Order"));
    assert_eq!(params.string_filters, ["slugify", "money", "nl2br"]);
    assert_eq!(params.color, ColorChoice::Never);
}

#[test]
fn schema_rejects_unknown_mode() {
    let result = schema_command().try_get_matches_from(["schema", ".", "--mode", "both"]);

    assert!(result.is_err());
}

#[test]
fn schema_requires_path() {
    let result = schema_command().try_get_matches_from(["schema"]);

    assert!(result.is_err());
}

#[test]
fn sample_accepts_schema_flags() {
    let m = sample_command()
        .try_get_matches_from(["sample", ".", "order", "--seed", "7", "--array-len", "3", "--mode", "output"])
        .unwrap();
    let params = SampleParams::from_matches(&m);

    assert_eq!(params.seed, 7);
    assert_eq!(params.array_len, 3);
    assert_eq!(params.schema.mode, SchemaMode::Output);
    assert_eq!(params.schema.template.as_deref(), Some("order"));
}

#[test]
fn sample_defaults() {
    let m = sample_command().try_get_matches_from(["sample", "note.txt"]).unwrap();
    let params = SampleParams::from_matches(&m);

    assert_eq!(params.seed, 0);
    assert_eq!(params.array_len, 2);
}

#[test]
fn check_flags() {
    let m = check_command()
        .try_get_matches_from(["check", ".", "--tree", "--color", "always"])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert!(params.tree);
    assert_eq!(params.template, None);
    assert_eq!(params.color, ColorChoice::Always);
}

#[test]
fn check_has_no_schema_flags() {
    let result = check_command().try_get_matches_from(["check", ".", "--mode", "output"]);

    assert!(result.is_err());
}

#[test]
fn list_and_deps_default_to_current_directory() {
    let m = list_command().try_get_matches_from(["list"]).unwrap();
    assert_eq!(ListParams::from_matches(&m).root, PathBuf::from("."));

    let m = deps_command()
        .try_get_matches_from(["deps", "site", "--imports"])
        .unwrap();
    let params = DepsParams::from_matches(&m);
    assert_eq!(params.root, PathBuf::from("site"));
    assert!(params.imports);
}

#[test]
fn verbose_is_global() {
    let m = build_cli()
        .try_get_matches_from(["temply", "list", "-vv"])
        .unwrap();

    let (_, sub) = m.subcommand().unwrap();
    assert_eq!(sub.get_count("verbose"), 2);
}
