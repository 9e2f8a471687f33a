use chrono::{Datelike, Timelike};
use indoc::indoc;

use crate::Metadata;
use crate::metadata::{jst, parse_timestamp};

#[test]
fn parses_header() {
    let source = indoc! {"
        {#-
        description: Order confirmation
        created_at: 2024-07-01 12:34:56
        created_by: alice
        updated_at: 2024/07/02
        updated_by:
        -#}
        Hello {{ name }}"};

    let (meta, body) = Metadata::split(source);

    assert_eq!(meta.description.as_deref(), Some("Order confirmation"));
    assert_eq!(meta.created_by.as_deref(), Some("alice"));
    assert_eq!(meta.updated_by, None);
    let created = meta.created_at.unwrap();
    assert_eq!((created.year(), created.month(), created.day()), (2024, 7, 1));
    assert_eq!((created.hour(), created.minute(), created.second()), (12, 34, 56));
    assert_eq!(created.offset(), &jst());
    let updated = meta.updated_at.unwrap();
    assert_eq!((updated.day(), updated.hour()), (2, 0));
    assert_eq!(body, "\nHello {{ name }}");
}

#[test]
fn source_without_header() {
    let (meta, body) = Metadata::split("{{ name }}");

    assert!(meta.is_empty());
    assert_eq!(body, "{{ name }}");
}

#[test]
fn header_must_open_the_template() {
    let meta = Metadata::parse("x{#- description: late -#}");

    assert!(meta.is_empty());
}

#[test]
fn unparsable_timestamps_are_dropped() {
    assert_eq!(parse_timestamp("yesterday"), None);
    assert_eq!(parse_timestamp("2024-13-01"), None);
    assert!(parse_timestamp("2024/07/01 08:00:00").is_some());

    let meta = Metadata::parse("{#- created_at: soon -#}");
    assert_eq!(meta.created_at, None);
}

#[test]
fn renders_back_to_comment() {
    let meta = Metadata {
        description: Some("Welcome".to_string()),
        created_at: parse_timestamp("2024-07-01"),
        created_by: Some("alice".to_string()),
        ..Metadata::default()
    };

    assert_eq!(
        meta.to_comment(),
        "{#-\n\
         description: Welcome\n\
         created_at: 2024-07-01 00:00:00\n\
         created_by: alice\n\
         updated_at: \n\
         updated_by: \n\
         -#}"
    );
    assert_eq!(Metadata::parse(&meta.to_comment()), meta);
}
