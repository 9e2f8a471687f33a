use indoc::indoc;

use crate::Error;
use crate::test_utils::{engine, infer_error, infer_named, infer_tree};

const GREET: &str = "{% macro greet(person) %}Hello {{ person.name }}{% endmacro %}";

fn invalid_message(err: Error) -> String {
    match err {
        Error::InvalidExpression { message, .. } => message,
        other => panic!("expected an invalid expression, got {other}"),
    }
}

#[test]
fn macro_call_argument_takes_parameter_shape() {
    let tree = infer_tree(&format!("{GREET}{{{{ greet(user) }}}}"));

    insta::assert_snapshot!(tree, @r"
    user: dictionary
      name: scalar
    ");
}

#[test]
fn macro_call_by_keyword() {
    let tree = infer_tree(&format!("{GREET}{{{{ greet(person=author) }}}}"));

    insta::assert_snapshot!(tree, @r"
    author: dictionary
      name: scalar
    ");
}

#[test]
fn macro_call_missing_argument() {
    let err = infer_error(&format!("{GREET}{{{{ greet() }}}}"));

    assert_eq!(invalid_message(err), "missing argument `person` for macro `greet`");
}

#[test]
fn macro_call_too_many_arguments() {
    let err = infer_error(&format!("{GREET}{{{{ greet(a, b) }}}}"));

    assert_eq!(invalid_message(err), "too many positional arguments for macro `greet`");
}

#[test]
fn macro_call_unknown_keyword() {
    let err = infer_error(&format!("{GREET}{{{{ greet(nobody=1) }}}}"));

    assert_eq!(invalid_message(err), "macro `greet` has no parameter `nobody`");
}

#[test]
fn macro_call_duplicate_argument() {
    let err = infer_error(&format!("{GREET}{{{{ greet(a, person=b) }}}}"));

    assert_eq!(invalid_message(err), "macro `greet` got multiple values for `person`");
}

#[test]
fn macro_call_argument_conflicting_with_parameter() {
    let err = infer_error(&format!("{GREET}{{{{ greet('someone') }}}}"));

    assert!(matches!(err, Error::MergeConflict(_)), "{err}");
}

#[test]
fn imported_namespace_macro() {
    let engine = engine(&[
        (
            "forms.html",
            r#"{% macro field(name, label="") %}<label>{{ label }}</label><input name="{{ name }}">{% endmacro %}"#,
        ),
        (
            "page.html",
            "{% import 'forms.html' as forms %}{{ forms.field(user.login) }}",
        ),
    ]);

    insta::assert_snapshot!(infer_named(&engine, "page.html"), @r"
    user: dictionary
      login: scalar
    ");
}

#[test]
fn imported_macro_by_name() {
    let engine = engine(&[
        ("forms.html", "{% macro field(name) %}{{ name }}{% endmacro %}"),
        (
            "page.html",
            "{% from 'forms.html' import field as f %}{{ f(title) }}",
        ),
        ("missing.html", "{% from 'forms.html' import nope %}"),
        ("unknown.html", "{% import 'forms.html' as forms %}{{ forms.nope(x) }}"),
    ]);

    insta::assert_snapshot!(infer_named(&engine, "page.html"), @"title: scalar");

    let err = engine.infer("missing.html").unwrap_err();
    assert_eq!(invalid_message(err), "`forms.html` does not define `nope`");

    let err = engine.infer("unknown.html").unwrap_err();
    assert_eq!(invalid_message(err), "`forms` has no macro `nope`");
}

#[test]
fn import_with_context_adds_requirements() {
    let engine = engine(&[
        ("helpers.html", "{% macro x() %}{% endmacro %}{{ brand }}"),
        ("a.html", "{% import 'helpers.html' as h with context %}"),
        ("b.html", "{% import 'helpers.html' as h %}"),
    ]);

    insta::assert_snapshot!(infer_named(&engine, "a.html"), @"brand: scalar");
    insta::assert_snapshot!(infer_named(&engine, "b.html"), @"");
}

#[test]
fn call_block_binds_its_parameters() {
    let tree = infer_tree(indoc! {"
        {% macro list(items) %}{% for i in items %}{{ caller(i) }}{% endfor %}{% endmacro %}
        {% call(entry) list(rows) %}{{ entry.label }}{% endcall %}"});

    insta::assert_snapshot!(tree, @r"
    rows: list
      []: unknown
    ");
}

#[test]
fn dict_call_entries_take_prediction() {
    let tree = infer_tree("{% set opts = dict(color=theme.primary) %}{{ opts.color }}");

    insta::assert_snapshot!(tree, @r"
    theme: dictionary
      primary: scalar
    ");
}

#[test]
fn range_arguments_are_integers() {
    let tree = infer_tree("{% for i in range(count) %}{{ i }}{% endfor %}");

    insta::assert_snapshot!(tree, @"count: integer");
}

#[test]
fn string_method_receiver() {
    let tree = infer_tree("{% for w in title.split(' ') %}{{ w }}{% endfor %}");

    insta::assert_snapshot!(tree, @"title: string");
}

#[test]
fn get_method_makes_key_optional() {
    let tree = infer_tree("{{ user.get('nickname') }}");

    insta::assert_snapshot!(tree, @r"
    user: dictionary
      nickname?: scalar
    ");
}

#[test]
fn unknown_function_and_method() {
    let err = infer_error("{{ now() }}");
    assert!(
        matches!(&err, Error::UnsupportedConstruct { kind: "function", name, .. } if name == "now"),
        "{err}"
    );

    let err = infer_error("{{ user.frob() }}");
    assert_eq!(err.to_string(), "line 1: unsupported method `frob`");
}
