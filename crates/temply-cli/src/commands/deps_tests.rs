use indoc::indoc;
use temply_compiler::Workspace;

use super::deps::{render, render_imports};
use super::test_utils::workspace_dir;

#[test]
fn dependency_tree() {
    let dir = workspace_dir(&[
        ("partials/button", "{% macro render(label) %}{{ label }}{% endmacro %}"),
        ("partials/icon", "{% macro render(name) %}{{ name }}{% endmacro %}"),
        (
            "partials/card",
            indoc! {"
                {%- from 'partials/button' import render as partials_button with context -%}
                {%- from 'partials/icon' import render as partials_icon with context -%}
                {% macro render(title) %}{{ partials_icon(title) }}{{ partials_button(title) }}{% endmacro %}
            "},
        ),
    ]);
    let workspace = Workspace::open(dir.path()).unwrap();

    assert_eq!(
        render(&workspace).unwrap(),
        indoc! {"
            button
            card
              button
              icon
            icon
        "}
    );
}

#[test]
fn import_lines() {
    let partials = vec!["footer".to_string(), "order-summary".to_string()];

    assert_eq!(
        render_imports(&partials),
        indoc! {"
            {%- from 'partials/footer' import render as partials_footer with context -%}
            {%- from 'partials/order-summary' import render as partials_order_summary with context -%}
        "}
    );
}
