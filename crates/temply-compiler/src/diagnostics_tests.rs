use crate::test_utils::{engine, infer_error};
use crate::{Error, parse};

#[test]
fn without_source_renders_one_line() {
    let err = Error::TemplateNotFound("emails/welcome.html".to_string());

    insta::assert_snapshot!(err.printer().render(), @"error: template not found: emails/welcome.html");
}

#[test]
fn error_without_position_ignores_source() {
    let err = Error::RecursionLimitExceeded;

    let out = err.printer().source("{{ x }}").render();

    assert_eq!(out, "error: recursion limit exceeded");
}

#[test]
fn underlines_the_offending_line() {
    let source = "Hello\n  {{ x|frob }}\n";
    let err = infer_error(source);

    let out = err.printer().source(source).render();

    assert!(out.starts_with("error: unsupported filter `frob`"), "{out}");
    assert!(out.contains("2 |   {{ x|frob }}"), "{out}");
    assert!(out.contains("^^^^^^^^^^^^"), "{out}");
}

#[test]
fn syntax_error_uses_its_span() {
    let source = "{{ user.name }\n";
    let err = parse(source).unwrap_err();

    let out = err.printer().source(source).path("welcome.html").render();

    assert!(out.starts_with("error: "), "{out}");
    assert!(out.contains("welcome.html"), "{out}");
    assert!(out.contains("1 | {{ user.name }"), "{out}");
}

#[test]
fn wrapped_error_renders_against_innermost_template() {
    let engine = engine(&[
        ("page.html", "{% include 'partial.html' %}"),
        ("partial.html", "{{ [1, 2] }}"),
    ]);
    let err = engine.infer("page.html").unwrap_err();
    let (template, _) = err.innermost();
    let template = template.unwrap();
    let source = engine.source(template).unwrap();

    let out = err.printer().source(&source).path(template).render();

    assert!(out.starts_with("error: expected scalar, found list[unknown]"), "{out}");
    assert!(out.contains("this is list"), "{out}");
    assert!(out.contains("partial.html"), "{out}");
}
