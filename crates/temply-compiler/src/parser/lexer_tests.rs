use super::lexer::{LineIndex, lex, token_text};

fn snapshot(input: &str) -> String {
    let tokens = lex(input).unwrap();
    let mut out = String::new();
    for token in tokens {
        out.push_str(&format!(
            "{:?} {:?}\n",
            token.kind,
            token_text(input, &token)
        ));
    }
    out
}

#[test]
fn data_and_variable() {
    insta::assert_snapshot!(snapshot("Hello {{ name }}!"), @r#"
    Data "Hello "
    VariableBegin "{{"
    Name "name"
    VariableEnd "}}"
    Data "!"
    "#);
}

#[test]
fn block_tags() {
    insta::assert_snapshot!(snapshot("{% if x %}yes{% endif %}"), @r#"
    BlockBegin "{%"
    Name "if"
    Name "x"
    BlockEnd "%}"
    Data "yes"
    BlockBegin "{%"
    Name "endif"
    BlockEnd "%}"
    "#);
}

#[test]
fn whitespace_control() {
    insta::assert_snapshot!(snapshot("a  {{- x -}}  b"), @r#"
    Data "a"
    VariableBegin "{{-"
    Name "x"
    VariableEnd "-}}"
    Data "b"
    "#);
}

#[test]
fn comments_are_dropped() {
    insta::assert_snapshot!(snapshot("a{# note #}b"), @r#"
    Data "a"
    Data "b"
    "#);
}

#[test]
fn raw_block_is_data() {
    insta::assert_snapshot!(snapshot("{% raw %}{{ x }}{% endraw %}"), @r#"Data "{{ x }}""#);
}

#[test]
fn braces_inside_variable() {
    insta::assert_snapshot!(snapshot("{{ {'a': 1} }}"), @r#"
    VariableBegin "{{"
    LBrace "{"
    String "'a'"
    Colon ":"
    Integer "1"
    RBrace "}"
    VariableEnd "}}"
    "#);
}

#[test]
fn operators() {
    insta::assert_snapshot!(snapshot("{{ a // b ** 2 != c ~ d }}"), @r#"
    VariableBegin "{{"
    Name "a"
    FloorDiv "//"
    Name "b"
    Pow "**"
    Integer "2"
    Ne "!="
    Name "c"
    Tilde "~"
    Name "d"
    VariableEnd "}}"
    "#);
}

#[test]
fn numbers() {
    insta::assert_snapshot!(snapshot("{{ 1_000 2.5 1e3 }}"), @r#"
    VariableBegin "{{"
    Integer "1_000"
    Float "2.5"
    Float "1e3"
    VariableEnd "}}"
    "#);
}

#[test]
fn unclosed_tag() {
    let err = lex("{{ x").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"line 1: unclosed tag, expected `}}`");
}

#[test]
fn unclosed_comment() {
    let err = lex("a\n{# never closed").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"line 2: unclosed comment");
}

#[test]
fn unexpected_character() {
    let err = lex("{{ x ? }}").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"line 1: unexpected character `?`");
}

#[test]
fn line_index() {
    let lines = LineIndex::new("a\nb\nc");
    assert_eq!(lines.line(0), 1);
    assert_eq!(lines.line(1), 1);
    assert_eq!(lines.line(2), 2);
    assert_eq!(lines.line(4), 3);
}
