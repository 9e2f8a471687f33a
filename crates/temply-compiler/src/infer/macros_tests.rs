use std::rc::Rc;

use temply_core::{ScalarKind, Shape, Variable};

use super::{Macro, MacroEntry, MacroTable};
use crate::test_utils::infer;

fn signature(name: &str) -> MacroEntry {
    MacroEntry::Macro(Rc::new(Macro {
        name: name.to_string(),
        args: vec![("value".to_string(), Variable::unknown())],
        kwargs: Vec::new(),
        catch_varargs: false,
        catch_kwargs: false,
    }))
}

#[test]
fn table_clones_do_not_see_later_inserts() {
    let mut parent = MacroTable::new();
    parent.insert("a", signature("a"));

    let mut child = parent.clone();
    child.insert("b", signature("b"));

    assert_eq!(parent.names(), ["a"]);
    assert_eq!(child.names(), ["a", "b"]);
}

#[test]
fn table_extend_replaces_same_names() {
    let mut base = MacroTable::new();
    base.insert("x", signature("x"));
    let mut other = MacroTable::new();
    other.insert("x", MacroEntry::Namespace(MacroTable::new()));
    other.insert("y", signature("y"));

    base.extend(&other);

    assert_eq!(base.len(), 2);
    assert!(base.get_namespace("x").is_some());
    assert!(base.get_macro("x").is_none());
    assert_eq!(base.get_macro("y").unwrap().name, "y");
}

#[test]
fn signature_lookup() {
    let m = Macro {
        name: "m".to_string(),
        args: vec![("a".to_string(), Variable::string())],
        kwargs: vec![("b".to_string(), Variable::integer())],
        catch_varargs: false,
        catch_kwargs: false,
    };

    assert_eq!(m.param("b"), Some(&Variable::integer()));
    assert_eq!(m.param("c"), None);
    let order: Vec<&str> = m.positional().map(|(name, _)| name.as_str()).collect();
    assert_eq!(order, ["a", "b"]);
}

#[test]
fn macro_parameters_are_bound() {
    let inference =
        infer(r#"{% macro render(title, subtitle="") %}{{ title }}{{ subtitle }}{% endmacro %}"#);

    assert_eq!(inference.requirements, Variable::dictionary());
    let render = inference.macros.get_macro("render").unwrap();
    assert_eq!(render.args.len(), 1);
    assert_eq!(render.args[0].0, "title");
    assert_eq!(render.args[0].1.scalar_kind(), Some(ScalarKind::Scalar));
    assert_eq!(render.kwargs.len(), 1);
    assert_eq!(render.kwargs[0].0, "subtitle");
    assert_eq!(render.kwargs[0].1.scalar_kind(), Some(ScalarKind::String));
    assert!(!render.catch_varargs);
    assert!(!render.catch_kwargs);
}

#[test]
fn macro_parameter_shape_comes_from_body() {
    let inference = infer("{% macro card(item) %}{{ item.title }}{% endmacro %}");

    let card = inference.macros.get_macro("card").unwrap();
    let item = &card.args[0].1;
    assert!(matches!(item.shape, Shape::Dictionary(_)));
    assert!(item.get("title").is_some());
}

#[test]
fn macro_reading_varargs_accepts_extra_arguments() {
    let inference = infer(indoc::indoc! {"
        {% macro tag(name) %}<{{ name }} {{ varargs|join(' ') }}>{% endmacro %}
        {{ tag('div', 'a', 'b') }}"});

    let tag = inference.macros.get_macro("tag").unwrap();
    assert!(tag.catch_varargs);
    assert!(!tag.catch_kwargs);
    assert_eq!(inference.requirements, Variable::dictionary());
}

#[test]
fn recursive_macro() {
    let inference = infer(indoc::indoc! {"
        {% macro tree(node) %}
          {{ node.name }}
          {% for child in node.children %}{{ tree(child) }}{% endfor %}
        {% endmacro %}"});

    let tree = inference.macros.get_macro("tree").unwrap();
    let node = &tree.args[0].1;
    assert_eq!(node.get("name").unwrap().scalar_kind(), Some(ScalarKind::Scalar));
    assert!(matches!(node.get("children").unwrap().shape, Shape::List(_)));
}

#[test]
fn macro_free_names_are_requirements() {
    let inference = infer("{% macro sig() %}{{ company.name }}{% endmacro %}");

    assert!(inference.requirements.get("company").is_some());
}
