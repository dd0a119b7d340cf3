//! Tests for the path grammar
//!
//! These tests verify:
//! - Request token sequences parse into the expected command plans
//! - Malformed sequences are rejected with parse errors
//! - Read/write asymmetries (whole-list, append, leftover tokens)

use arborkv::protocol::{Command, CommandKind, ListOp, Step};
use arborkv::ArborError;

// =============================================================================
// Helper Functions
// =============================================================================

fn tokens(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

fn parse(fields: &[&str]) -> arborkv::Result<Command> {
    Command::parse(&tokens(fields))
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn rejects_malformed_requests() {
    let cases: &[&[&str]] = &[
        &[],
        &[""],
        &["net"],
        &["get"],
        &["set", "a"],
        &["set"],
        &["net", "key"],
        &["get", "+", "+", "a"],
        &["get", "a", "+", "+"],
        &["set", "a", "+", "+"],
        &["set", "a", "+", "+", "+", "+"],
    ];

    for case in cases {
        let result = parse(case);
        assert!(
            matches!(result, Err(ArborError::Parse(_))),
            "expected parse error for {case:?}, got {result:?}"
        );
    }
}

#[test]
fn rejects_append_in_get() {
    let err = parse(&["get", "a", "+", "+"]).unwrap_err();
    assert!(err.to_string().contains("no append command allowed in get calls"));
}

#[test]
fn rejects_bare_list_token_in_set() {
    // Path is a lone `+` (the trailing token is the payload).
    let err = parse(&["set", "a", "+", "v"]).unwrap_err();
    assert!(err
        .to_string()
        .contains("list command expects index/append value, none given"));
}

#[test]
fn rejects_non_integer_list_index() {
    let err = parse(&["get", "key", "+", "x2"]).unwrap_err();
    assert!(err.to_string().contains("invalid list index"));
}

#[test]
fn rejects_tokens_after_scalar_step_on_get() {
    let err = parse(&["get", "key", "_", "more"]).unwrap_err();
    assert!(err.to_string().contains("extra values received on get"));
}

#[test]
fn ignores_tokens_after_scalar_step_on_set() {
    // Writes stop consuming at `_`; what trails it is dropped.
    let command = parse(&["set", "key", "_", "stray", "val"]).unwrap();
    assert_eq!(command.steps, vec![Step::Scalar]);
    assert_eq!(command.payload, "val");
}

// =============================================================================
// Command Plan Tests
// =============================================================================

#[test]
fn parses_bare_get() {
    let command = parse(&["get", "tkey"]).unwrap();
    assert_eq!(
        command,
        Command {
            kind: CommandKind::Get,
            key: "tkey".to_string(),
            steps: vec![],
            payload: String::new(),
        }
    );
}

#[test]
fn parses_bare_set() {
    let command = parse(&["set", "abc", "cba"]).unwrap();
    assert_eq!(
        command,
        Command {
            kind: CommandKind::Set,
            key: "abc".to_string(),
            steps: vec![],
            payload: "cba".to_string(),
        }
    );
}

#[test]
fn parses_scalar_step() {
    let command = parse(&["get", "tkey", "_"]).unwrap();
    assert_eq!(command.steps, vec![Step::Scalar]);

    let command = parse(&["set", "tkey", "_", "val"]).unwrap();
    assert_eq!(command.steps, vec![Step::Scalar]);
    assert_eq!(command.payload, "val");
}

#[test]
fn parses_reserved_token_as_top_key() {
    // The top-level key is consumed before the grammar applies.
    let command = parse(&["get", "+"]).unwrap();
    assert_eq!(command.key, "+");
    assert!(command.steps.is_empty());
}

#[test]
fn parses_whole_list_get() {
    let command = parse(&["get", "key", "+"]).unwrap();
    assert_eq!(command.steps, vec![Step::List(ListOp::Whole)]);
}

#[test]
fn parses_list_index() {
    let command = parse(&["get", "key", "+", "12"]).unwrap();
    assert_eq!(command.steps, vec![Step::List(ListOp::Index(12))]);

    let command = parse(&["set", "key", "+", "31", "V"]).unwrap();
    assert_eq!(command.steps, vec![Step::List(ListOp::Index(31))]);
    assert_eq!(command.payload, "V");
}

#[test]
fn parses_list_append_set() {
    let command = parse(&["set", "key", "+", "+", "V"]).unwrap();
    assert_eq!(command.steps, vec![Step::List(ListOp::Append)]);
    assert_eq!(command.payload, "V");
}

#[test]
fn parses_map_step() {
    let command = parse(&["get", "key", "inkey"]).unwrap();
    assert_eq!(command.steps, vec![Step::Map("inkey".to_string())]);
}

#[test]
fn parses_append_then_map_path() {
    let command = parse(&["set", "key", "+", "+", "mykey", "abc"]).unwrap();
    assert_eq!(
        command.steps,
        vec![
            Step::List(ListOp::Append),
            Step::Map("mykey".to_string()),
        ]
    );
    assert_eq!(command.payload, "abc");
}

#[test]
fn parses_nested_map_path() {
    let command = parse(&["set", "k", "a", "b", "v1"]).unwrap();
    assert_eq!(
        command.steps,
        vec![Step::Map("a".to_string()), Step::Map("b".to_string())]
    );
    assert_eq!(command.payload, "v1");
}

#[test]
fn parses_negative_index_as_index() {
    // Syntactically an integer; bounds are checked at evaluation time.
    let command = parse(&["get", "key", "+", "-1"]).unwrap();
    assert_eq!(command.steps, vec![Step::List(ListOp::Index(-1))]);
}
