use crate::variable::{Literal, ScalarKind, Variable};
use crate::{Colors, dump};

#[test]
fn dump_nested_list() {
    let root = Variable::dictionary_of([(
        "items",
        Variable::list(Variable::dictionary_of([(
            "price",
            Variable::scalar(ScalarKind::Scalar),
        )])),
    )]);

    insta::assert_snapshot!(dump(&root, Colors::OFF), @r"
    items: list
      []: dictionary
        price: scalar
    ");
}

#[test]
fn dump_marks_optional_and_literals() {
    let mut title = Variable::string();
    title.meta.used_with_default = true;
    let root = Variable::dictionary_of([
        ("title", title),
        ("kind", Variable::literal(Literal::String("order".to_string()))),
        (
            "pair",
            Variable::tuple(vec![Variable::integer(), Variable::unknown()]),
        ),
        ("extra", Variable::additional_properties(Variable::boolean())),
    ]);

    insta::assert_snapshot!(dump(&root, Colors::OFF), @r#"
    title?: string
    kind: string = "order"
    pair: tuple
      [0]: integer
      [1]: unknown
    extra: map
      [*]: boolean
    "#);
}

#[test]
fn dump_union_members() {
    let root = Variable::dictionary_of([(
        "value",
        Variable::any_of(vec![Variable::string(), Variable::list(Variable::unknown())]),
    )]);

    insta::assert_snapshot!(dump(&root, Colors::OFF), @r"
    value: any of
      |: list
        []: unknown
      |: string
    ");
}

#[test]
fn dump_colored_names() {
    let root = Variable::dictionary_of([("a", Variable::string())]);
    assert_eq!(dump(&root, Colors::ON), "\x1b[34ma\x1b[0m: string\n");
}
