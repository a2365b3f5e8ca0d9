//! Prompt templates fed with real `execute_query` output.

use echodb_mcp::models::{ExecuteQueryOutput, Row};
use echodb_mcp::prompts::{EMPTY_RESULTS_TEXT, TableTemplate, system_prompt_from_text};
use echodb_mcp::tools::format::render;
use serde_json::json;

fn query_output(rows: Vec<Row>) -> String {
    let output = ExecuteQueryOutput {
        row_count: rows.len(),
        formatted: render(&rows),
        rows,
        note: None,
        presentation: "table".to_string(),
    };
    serde_json::to_string(&output).unwrap()
}

fn sales_rows() -> Vec<Row> {
    serde_json::from_value(json!([
        {"region": "north", "revenue": 1200.5},
        {"region": "south", "revenue": 980}
    ]))
    .unwrap()
}

#[test]
fn test_all_templates_handle_empty_results() {
    let empty = query_output(Vec::new());
    for template in TableTemplate::ALL {
        assert_eq!(template.render(&empty, Some("ignored")).unwrap(), EMPTY_RESULTS_TEXT);
    }
}

#[test]
fn test_templates_embed_results_and_context() {
    let results = query_output(sales_rows());
    let cases = [
        (TableTemplate::Table, "Table Title: Revenue by region"),
        (TableTemplate::Summary, "Summary Type: Revenue by region"),
        (TableTemplate::Comparison, "Comparison Dimension: Revenue by region"),
    ];
    for (template, context_line) in cases {
        let text = template.render(&results, Some("Revenue by region")).unwrap();
        assert!(text.contains(context_line), "{}", template.name());
        assert!(text.contains("\"region\": \"north\""));
        assert!(text.contains("Data to format:\n```json\n"));
    }
}

#[test]
fn test_template_names() {
    let names: Vec<&str> = TableTemplate::ALL.iter().map(|t| t.name()).collect();
    assert_eq!(
        names,
        vec!["format_table", "format_summary_table", "format_comparison_table"]
    );
}

#[test]
fn test_invalid_results_json() {
    for template in TableTemplate::ALL {
        assert!(template.render("{rows: [", None).is_err());
    }
}

#[test]
fn test_system_prompt_with_schema_text() {
    let schema = json!({"tables": {"users": {"columns": [{"name": "id", "type": "INTEGER"}]}}});
    let prompt = system_prompt_from_text(Some(&schema.to_string())).unwrap();
    assert!(prompt.contains("## Database Schema"));
    assert!(prompt.contains("\"users\""));
    assert!(prompt.find("## Database Schema").unwrap() < prompt.find("Remember:").unwrap());
}
