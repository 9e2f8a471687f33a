use std::fs;

use temply_compiler::{Error, InferConfig};
use temply_core::Colors;

use super::check::{check, render_tree};
use super::target::{CommandError, Target};
use super::test_utils::workspace_dir;

#[test]
fn whole_workspace() {
    let dir = workspace_dir(&[
        ("templates/order/email.html", "{{ order.id }}"),
        ("templates/broken/email.html", "{{ x|frobnicate }}"),
        ("layouts/base.html", "{% if %}{% endif %}"),
        ("partials/footer.html", "{{ company }}"),
    ]);
    let target = Target::open(dir.path(), InferConfig::new()).unwrap();

    let outcomes = check(&target, None).unwrap();

    let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(
        names,
        ["broken", "order", "layouts/base.html", "partials/footer.html"]
    );
    assert!(matches!(
        &outcomes[0].result,
        Err(CommandError::Template(Error::InTemplate { .. }))
    ));
    assert!(matches!(&outcomes[1].result, Ok(Some(_))));
    assert!(matches!(
        &outcomes[2].result,
        Err(CommandError::Template(Error::Syntax { .. }))
    ));
    assert!(matches!(&outcomes[3].result, Ok(None)));
}

#[test]
fn single_template() {
    let dir = workspace_dir(&[
        ("templates/order/email.html", "{{ order.id }}"),
        ("templates/broken/email.html", "{{ x|frobnicate }}"),
    ]);
    let target = Target::open(dir.path(), InferConfig::new()).unwrap();

    let outcomes = check(&target, Some("order")).unwrap();

    assert_eq!(outcomes.len(), 1);
    let Ok(Some(requirements)) = &outcomes[0].result else {
        panic!("order should infer");
    };
    insta::assert_snapshot!(render_tree("order", requirements, Colors::OFF), @r"
    order:
      order: dictionary
        id: scalar
    ");
}

#[test]
fn template_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    fs::write(&path, "{{ body|frobnicate }}").unwrap();
    let target = Target::open(&path, InferConfig::new()).unwrap();

    let outcomes = check(&target, None).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].name, "note.txt");
    let Err(err) = &outcomes[0].result else {
        panic!("unknown filter should fail");
    };
    insta::assert_snapshot!(err.to_string(), @"line 1: unsupported filter `frobnicate`");
}
