//! Result renderer output shapes.

use echodb_mcp::models::Row;
use echodb_mcp::tools::format::render;
use serde_json::{Value, json};

fn rows(values: Value) -> Vec<Row> {
    serde_json::from_value(values).unwrap()
}

#[test]
fn test_empty_result_sentinel() {
    assert_eq!(render(&[]), "No results found.");
}

#[test]
fn test_single_row_key_value() {
    assert_eq!(render(&rows(json!([{"a": 1}]))), "a: 1");
    assert_eq!(
        render(&rows(json!([{"id": 7, "name": "Ada", "active": true, "note": null}]))),
        "id: 7\nname: Ada\nactive: true\nnote: "
    );
}

#[test]
fn test_single_row_is_not_escaped() {
    assert_eq!(render(&rows(json!([{"v": "a|b"}]))), "v: a|b");
}

#[test]
fn test_two_rows_four_line_table() {
    let out = render(&rows(json!([{"a": 1}, {"a": 2}])));
    let lines: Vec<&str> = out.split('\n').collect();
    assert_eq!(lines, vec!["| a |", "| --- |", "| 1 |", "| 2 |"]);
}

#[test]
fn test_cell_escaping() {
    let out = render(&rows(json!([{"v": "x|y\nz"}, {"v": "plain"}])));
    assert!(out.contains("| x\\|y z |"));
    assert!(out.ends_with("| plain |"));
}

#[test]
fn test_union_of_columns() {
    let out = render(&rows(json!([{"a": 1, "b": 2}, {"a": 3}])));
    let lines: Vec<&str> = out.split('\n').collect();
    assert_eq!(lines[0], "| a | b |");
    assert_eq!(lines[3], "| 3 |  |");
}

#[test]
fn test_nested_json_values_compact() {
    let out = render(&rows(json!([{"tags": ["x", "y"]}, {"tags": {"k": 1}}])));
    assert!(out.contains(r#"| ["x","y"] |"#));
    assert!(out.contains(r#"| {"k":1} |"#));
}

#[test]
fn test_floats_and_large_integers() {
    let out = render(&rows(json!([{"n": 1.5}, {"n": 9007199254740993_i64}])));
    assert!(out.contains("| 1.5 |"));
    assert!(out.contains("| 9007199254740993 |"));
}
