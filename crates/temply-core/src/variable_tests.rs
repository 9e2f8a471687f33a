use crate::variable::{Literal, ScalarKind, Shape, Variable};

#[test]
fn fresh_variable_is_required() {
    let var = Variable::string();
    assert!(var.is_required());

    let mut defaulted = Variable::string();
    defaulted.meta.used_with_default = true;
    assert!(!defaulted.is_required());

    let mut checked = Variable::unknown();
    checked.meta.checked_as_defined = true;
    assert!(!checked.is_required());
}

#[test]
fn literal_is_constant_with_kind() {
    let var = Variable::literal(Literal::Integer(3));
    assert_eq!(var.scalar_kind(), Some(ScalarKind::Integer));
    assert!(var.meta.constant);
    assert_eq!(var.meta.value, Some(Literal::Integer(3)));

    let none = Variable::literal(Literal::None);
    assert!(none.is_unknown());
    assert!(none.meta.constant);
}

#[test]
fn line_numbers_stay_sorted() {
    let var = Variable::string().at_line(5).at_line(2).at_line(5);
    assert_eq!(var.meta.linenos, vec![2, 5]);
}

#[test]
fn any_of_collapses_duplicates() {
    let var = Variable::any_of(vec![Variable::string(), Variable::string()]);
    assert_eq!(var.shape, Shape::Scalar(ScalarKind::String));

    let union = Variable::any_of(vec![Variable::integer(), Variable::string(), Variable::integer()]);
    let Shape::AnyOf(members) = &union.shape else {
        panic!("expected a union, got {union}");
    };
    assert_eq!(members.len(), 2);
}

#[test]
fn dictionary_access() {
    let mut var = Variable::dictionary_of([("a", Variable::string()), ("b", Variable::integer())]);
    assert_eq!(var.get("a").and_then(Variable::scalar_kind), Some(ScalarKind::String));
    assert!(var.get("c").is_none());

    let removed = var.remove("a");
    assert!(removed.is_some());
    let keys: Vec<&String> = var.as_dictionary().map(|d| d.keys().collect()).unwrap_or_default();
    assert_eq!(keys, vec!["b"]);
}

#[test]
fn skeleton_keeps_leaf_kind_only() {
    let var = Variable::integer().at_line(4).constant();
    let skeleton = var.skeleton();
    assert_eq!(skeleton.scalar_kind(), Some(ScalarKind::Integer));
    assert!(skeleton.meta.linenos.is_empty());
    assert!(!skeleton.meta.constant);

    assert!(Variable::list(Variable::string()).skeleton().is_unknown());
}

#[test]
fn display_nested() {
    let var = Variable::dictionary_of([
        ("a", Variable::string()),
        ("b", Variable::list(Variable::integer())),
        ("c", Variable::tuple(vec![Variable::unknown(), Variable::boolean()])),
        ("d", Variable::additional_properties(Variable::number())),
    ]);
    assert_eq!(
        var.to_string(),
        "{a: string, b: list[integer], c: tuple[unknown, boolean], d: map[number]}"
    );
}

#[test]
fn scalar_subtyping() {
    assert!(ScalarKind::Integer.is_subtype_of(ScalarKind::Number));
    assert!(ScalarKind::String.is_subtype_of(ScalarKind::Scalar));
    assert!(!ScalarKind::Number.is_subtype_of(ScalarKind::Integer));
    assert!(!ScalarKind::Boolean.is_subtype_of(ScalarKind::String));
}
