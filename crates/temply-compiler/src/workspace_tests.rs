use std::fs;

use tempfile::TempDir;
use temply_core::{Colors, SampleConfig, SchemaConfig, dump};

use crate::workspace::{partial_import_line, validate_name};
use crate::{Error, Workspace};

fn workspace(files: &[(&str, &str)]) -> (TempDir, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["templates", "layouts", "partials"] {
        fs::create_dir(dir.path().join(sub)).unwrap();
    }
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    let workspace = Workspace::open(dir.path()).unwrap();
    (dir, workspace)
}

fn order_workspace() -> (TempDir, Workspace) {
    workspace(&[
        ("layouts/base.html", "{% block body %}{% endblock %}{{ company }}"),
        (
            "templates/order/email.html",
            "{% extends 'layouts/base.html' %}{% block body %}{{ order.id }}{% endblock %}",
        ),
        ("templates/order/sms.txt", "{{ order.total|round }} {{ customer.name }}"),
        ("templates/order/schema.json", "{}"),
        ("templates/order/.DS_Store", ""),
        ("templates/welcome/email.html", "Hi {{ name }}"),
        ("templates/.drafts/email.html", ""),
        ("partials/footer.html", "{{ company }}"),
    ])
}

#[test]
fn open_requires_all_directories() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("templates")).unwrap();

    let err = Workspace::open(dir.path()).err().unwrap();

    assert!(matches!(&err, Error::MissingDirectory(path) if path.ends_with("layouts")), "{err}");
}

#[test]
fn listings_skip_dotfiles_and_schemas() {
    let (_dir, ws) = order_workspace();

    assert_eq!(ws.template_names().unwrap(), ["order", "welcome"]);
    assert_eq!(ws.component_names("order").unwrap(), ["email.html", "sms.txt"]);
    assert_eq!(ws.layout_names().unwrap(), ["base.html"]);
    assert_eq!(ws.partial_names().unwrap(), ["footer.html"]);
}

#[test]
fn missing_template_directory() {
    let (_dir, ws) = order_workspace();

    let err = ws.component_names("nope").unwrap_err();

    assert!(matches!(&err, Error::TemplateNotFound(name) if name == "templates/nope"), "{err}");
}

#[test]
fn names_are_single_segments() {
    assert!(validate_name("email.html").is_ok());
    for bad in ["", "a/b", "..", ".hidden", "a\\b"] {
        assert!(matches!(validate_name(bad), Err(Error::InvalidName { .. })), "{bad}");
    }
}

#[test]
fn template_requirements_merge_components() {
    let (_dir, ws) = order_workspace();

    let requirements = ws.template_requirements("order").unwrap();

    insta::assert_snapshot!(dump(&requirements, Colors::OFF), @r"
    company: scalar
    order: dictionary
      id: scalar
      total: number
    customer: dictionary
      name: scalar
    ");
}

#[test]
fn template_sample_validates_against_schema() {
    let (_dir, ws) = order_workspace();
    let config = SchemaConfig::default();

    let schema = ws.template_schema("order", &config).unwrap();
    let sample = ws
        .template_sample("order", &config, &SampleConfig::new().seed(7))
        .unwrap();

    assert_eq!(schema["type"], "object");
    let validator = jsonschema::validator_for(&schema).unwrap();
    let errors: Vec<String> = validator.iter_errors(&sample).map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn partial_import_statement() {
    insta::assert_snapshot!(
        partial_import_line("order-summary.html"),
        @"{%- from 'partials/order-summary.html' import render as partials_order_summary.html with context -%}"
    );
}

#[test]
fn partial_dependencies_follow_imports() {
    let (_dir, ws) = workspace(&[
        ("partials/button", "{% macro render(label) %}{{ label }}{% endmacro %}"),
        (
            "partials/card",
            "{% from 'partials/button' import render as partials_button with context %}\
             {% import 'layouts/base' as base %}\
             {% macro render(title) %}{{ partials_button(title) }}{% endmacro %}",
        ),
        ("layouts/base", ""),
    ]);

    let dependencies = ws.partial_dependencies().unwrap();

    assert!(dependencies["button"].is_empty());
    assert_eq!(dependencies["card"].iter().collect::<Vec<_>>(), ["button"]);
}

#[test]
fn component_errors_name_the_component() {
    let (_dir, ws) = workspace(&[("templates/t/a.html", "{{ x|frobnicate }}")]);

    let err = ws.template_requirements("t").unwrap_err();
    let (template, inner) = err.innermost();

    assert_eq!(template, Some("templates/t/a.html"));
    assert!(matches!(inner, Error::UnsupportedConstruct { kind: "filter", .. }), "{inner}");
}
