use crate::merge::{
    checked, definedness, merge, merge_all, merge_branches, merge_rtypes, merge_with, same_structure,
};
use crate::variable::{ScalarKind, Shape, Variable};

#[test]
fn unknown_is_identity() {
    let merged = merge(&Variable::unknown(), &Variable::string()).unwrap();
    assert_eq!(merged.scalar_kind(), Some(ScalarKind::String));

    let merged = merge(&Variable::list(Variable::integer()), &Variable::unknown()).unwrap();
    assert!(same_structure(&merged, &Variable::list(Variable::integer())));
}

#[test]
fn merge_is_idempotent() {
    let var = Variable::dictionary_of([
        ("a", Variable::string()),
        ("b", Variable::list(Variable::dictionary_of([("c", Variable::integer())]))),
    ]);
    let merged = merge(&var, &var).unwrap();
    assert!(same_structure(&merged, &var));
}

#[test]
fn scalar_takes_more_specific_kind() {
    let merged = merge(&Variable::scalar(ScalarKind::Scalar), &Variable::string()).unwrap();
    assert_eq!(merged.scalar_kind(), Some(ScalarKind::String));

    let merged = merge(&Variable::number(), &Variable::integer()).unwrap();
    assert_eq!(merged.scalar_kind(), Some(ScalarKind::Integer));
}

#[test]
fn scalar_conflict_reports_lines() {
    let err = merge(&Variable::string().at_line(1), &Variable::integer().at_line(3)).unwrap_err();
    assert_eq!(err.to_string(), "cannot merge string (line 1) with integer (line 3)");
    assert_eq!(err.line(), Some(1));
}

#[test]
fn dictionaries_union_keys() {
    let left = Variable::dictionary_of([("a", Variable::string())]);
    let right = Variable::dictionary_of([("b", Variable::integer()), ("a", Variable::unknown())]);
    let merged = merge(&left, &right).unwrap();
    assert_eq!(merged.to_string(), "{a: string, b: integer}");
}

#[test]
fn nested_conflict_propagates() {
    let left = Variable::dictionary_of([("a", Variable::dictionary())]);
    let right = Variable::dictionary_of([("a", Variable::list(Variable::unknown()))]);
    assert!(merge(&left, &right).is_err());
}

#[test]
fn lists_merge_items() {
    let left = Variable::list(Variable::dictionary_of([("x", Variable::string())]));
    let right = Variable::list(Variable::dictionary_of([("y", Variable::string())]));
    let merged = merge(&left, &right).unwrap();
    assert_eq!(merged.to_string(), "list[{x: string, y: string}]");
}

#[test]
fn tuples_need_equal_arity() {
    let pair = Variable::tuple(vec![Variable::unknown(), Variable::string()]);
    let typed = Variable::tuple(vec![Variable::integer(), Variable::unknown()]);
    let merged = merge(&pair, &typed).unwrap();
    assert_eq!(merged.to_string(), "tuple[integer, string]");

    let triple = Variable::tuple(vec![Variable::unknown(); 3]);
    assert!(merge(&pair, &triple).is_err());
}

#[test]
fn map_against_dictionary_keeps_entries_optional() {
    let map = Variable::additional_properties(Variable::string());
    let dict = Variable::dictionary_of([("a", Variable::string())]);

    for merged in [merge(&map, &dict).unwrap(), merge(&dict, &map).unwrap()] {
        assert!(matches!(merged.shape, Shape::Dictionary(_)));
        let entry = merged.get("a").unwrap();
        assert!(entry.meta.checked_as_undefined);
        assert!(!entry.is_required());
    }
}

#[test]
fn union_merges_into_every_member() {
    let union = Variable::any_of(vec![
        Variable::dictionary_of([("x", Variable::string())]),
        Variable::dictionary_of([("y", Variable::integer())]),
    ]);
    let merged = merge(&union, &Variable::dictionary_of([("z", Variable::boolean())])).unwrap();
    assert_eq!(
        merged.to_string(),
        "any of[{x: string, z: boolean} | {y: integer, z: boolean}]"
    );

    let scalars = Variable::any_of(vec![Variable::scalar(ScalarKind::Scalar), Variable::string()]);
    let unchanged = merge(&scalars, &Variable::string()).unwrap();
    assert_eq!(unchanged.to_string(), "string");
}

#[test]
fn union_conflicts_when_any_member_rejects() {
    let union = Variable::any_of(vec![
        Variable::dictionary_of([("x", Variable::string())]),
        Variable::scalar(ScalarKind::Scalar),
    ]);
    assert!(merge(&union, &Variable::string()).is_err());
    assert!(merge(&Variable::string(), &union).is_err());

    let mixed = Variable::any_of(vec![Variable::string(), Variable::list(Variable::unknown())]);
    assert!(merge(&mixed, &Variable::list(Variable::integer())).is_err());
}

#[test]
fn union_rejects_value_no_member_accepts() {
    let union = Variable::any_of(vec![Variable::string(), Variable::list(Variable::unknown())]);
    assert!(merge(&union, &Variable::dictionary()).is_err());
    assert!(merge(&Variable::integer(), &union).is_err());
}

#[test]
fn unions_merge_as_set() {
    let a = Variable::any_of(vec![Variable::string(), Variable::list(Variable::unknown())]);
    let b = Variable::any_of(vec![Variable::list(Variable::unknown()), Variable::boolean()]);
    let merged = merge(&a, &b).unwrap();
    let Shape::AnyOf(members) = &merged.shape else {
        panic!("expected a union, got {merged}");
    };
    assert_eq!(members.len(), 3);
}

#[test]
fn metadata_combines() {
    let mut left = Variable::string().at_line(2);
    left.meta.used_with_default = true;
    left.meta.label = Some("name".to_string());
    let right = Variable::string().at_line(7);

    let merged = merge(&left, &right).unwrap();
    assert_eq!(merged.meta.linenos, vec![2, 7]);
    assert_eq!(merged.meta.label.as_deref(), Some("name"));
    assert!(!merged.meta.used_with_default);
}

#[test]
fn order_comes_from_left() {
    let merged = merge(&Variable::string().with_order(5), &Variable::string().with_order(1)).unwrap();
    assert_eq!(merged.meta.order_nr, Some(5));

    let merged = merge(&Variable::unknown(), &Variable::string().with_order(3)).unwrap();
    assert_eq!(merged.meta.order_nr, None);
}

#[test]
fn checked_combiner_keeps_left_check() {
    let mut left = Variable::unknown();
    left.meta.checked_as_defined = true;
    let right = Variable::string();

    assert!(!merge(&left, &right).unwrap().meta.checked_as_defined);
    assert!(merge_with(&left, &right, Some(checked)).unwrap().meta.checked_as_defined);
}

#[test]
fn definedness_combiner() {
    let mut left = Variable::unknown();
    left.meta.checked_as_defined = true;
    left.meta.checked_as_undefined = true;
    let mut right = Variable::unknown();
    right.meta.checked_as_undefined = true;

    let merged = merge_with(&left, &right, Some(definedness)).unwrap();
    assert!(merged.meta.checked_as_defined);
    assert!(merged.meta.checked_as_undefined);

    let merged = merge_with(&right, &Variable::unknown(), Some(definedness)).unwrap();
    assert!(!merged.meta.checked_as_defined);
    assert!(!merged.meta.checked_as_undefined);
}

#[test]
fn merge_all_folds() {
    let vars = [
        Variable::dictionary_of([("a", Variable::string())]),
        Variable::dictionary_of([("b", Variable::string())]),
        Variable::dictionary_of([("c", Variable::string())]),
    ];
    let merged = merge_all(&vars).unwrap();
    assert_eq!(merged.to_string(), "{a: string, b: string, c: string}");
    assert!(merge_all(std::iter::empty::<&Variable>()).unwrap().is_unknown());
}

#[test]
fn additive_operands_must_be_related() {
    assert!(merge_rtypes(&Variable::string(), &Variable::integer(), true).is_err());
    assert!(merge_rtypes(&Variable::list(Variable::unknown()), &Variable::string(), true).is_err());

    let merged = merge_rtypes(&Variable::number(), &Variable::integer(), true).unwrap();
    assert_eq!(merged.scalar_kind(), Some(ScalarKind::Integer));

    let merged = merge_rtypes(&Variable::unknown(), &Variable::string(), true).unwrap();
    assert_eq!(merged.scalar_kind(), Some(ScalarKind::String));
}

#[test]
fn branches_union_top_level_keys() {
    let then = Variable::dictionary_of([("a", Variable::string())]);
    let otherwise = Variable::dictionary_of([("b", Variable::string())]);
    let merged = merge_branches(&then, &otherwise).unwrap();
    assert_eq!(merged.to_string(), "{a: string, b: string}");
}

#[test]
fn branches_keep_differing_dictionaries_apart() {
    let then = Variable::dictionary_of([("b", Variable::dictionary_of([("x", Variable::string())]))]);
    let otherwise =
        Variable::dictionary_of([("b", Variable::dictionary_of([("y", Variable::string())]))]);
    let merged = merge_branches(&then, &otherwise).unwrap();
    assert_eq!(merged.to_string(), "{b: any of[{x: string} | {y: string}]}");
}

#[test]
fn branches_merge_matching_dictionaries() {
    let then = Variable::dictionary_of([(
        "b",
        Variable::dictionary_of([("x", Variable::unknown())]),
    )]);
    let otherwise = Variable::dictionary_of([(
        "b",
        Variable::dictionary_of([("x", Variable::integer())]),
    )]);
    let merged = merge_branches(&then, &otherwise).unwrap();
    assert_eq!(merged.to_string(), "{b: {x: integer}}");
}

#[test]
fn branches_turn_conflicts_into_alternatives() {
    let then = Variable::dictionary_of([("v", Variable::string())]);
    let otherwise = Variable::dictionary_of([("v", Variable::list(Variable::unknown()))]);
    let merged = merge_branches(&then, &otherwise).unwrap();
    assert_eq!(merged.to_string(), "{v: any of[list[unknown] | string]}");
}
