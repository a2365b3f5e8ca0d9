//! Table formatting prompts.
//!
//! Each template turns the JSON returned by `execute_query` into one user
//! message asking the model to present it as a particular kind of table.

use crate::error::{DbError, DbResult};
use serde_json::Value as JsonValue;

/// Message sent when there is nothing to format.
pub const EMPTY_RESULTS_TEXT: &str = "No data to format. The query returned empty results.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableTemplate {
    Table,
    Summary,
    Comparison,
}

impl TableTemplate {
    pub const ALL: [TableTemplate; 3] = [Self::Table, Self::Summary, Self::Comparison];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Table => "format_table",
            Self::Summary => "format_summary_table",
            Self::Comparison => "format_comparison_table",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Table => {
                "Formats database query results as a well-structured markdown table \
                 with headers and aligned columns."
            }
            Self::Summary => {
                "Creates a summary table with statistics (counts, sums, averages) \
                 from aggregated query results."
            }
            Self::Comparison => {
                "Creates a comparison table showing differences between data sets, \
                 time periods or categories side by side."
            }
        }
    }

    fn opening(&self) -> &'static str {
        match self {
            Self::Table => {
                "Format the following database query results as a well-structured markdown table."
            }
            Self::Summary => {
                "Format the following aggregated query results as a summary statistics table."
            }
            Self::Comparison => "Format the following query results as a comparison table.",
        }
    }

    fn requirements(&self) -> [&'static str; 5] {
        match self {
            Self::Table => [
                "Create a table with proper headers (use column names from the data)",
                "Align columns appropriately (text left, numbers right)",
                "Format numbers with appropriate precision (avoid unnecessary decimals)",
                "Truncate very long text values appropriately",
                "Include a summary row if applicable (totals, averages, etc.)",
            ],
            Self::Summary => [
                "Create a clear table with metric names as rows and values as columns (or vice versa)",
                "Highlight key metrics (totals, averages, percentages)",
                "Format numbers appropriately (currency, percentages, decimals)",
                "Add brief insights or highlights if significant patterns are present",
                "Include a title describing the summary",
            ],
            Self::Comparison => [
                "Create a table that clearly shows comparisons between items",
                "Highlight differences or changes (use indicators like ↑, ↓, or % change)",
                "Format numbers consistently for easy comparison",
                "Add a column or row showing percentage changes if applicable",
                "Include a title describing what is being compared",
            ],
        }
    }

    /// Label for the optional argument line.
    fn context_label(&self) -> &'static str {
        match self {
            Self::Table => "Table Title",
            Self::Summary => "Summary Type",
            Self::Comparison => "Comparison Dimension",
        }
    }

    fn closing(&self) -> &'static str {
        match self {
            Self::Table => {
                "Please format this data as a markdown table with proper alignment and formatting."
            }
            Self::Summary => {
                "Please format this as a summary table with proper numeric formatting and insights."
            }
            Self::Comparison => {
                "Please format this as a comparison table with clear visual indicators of differences."
            }
        }
    }

    /// Build the message text for `query_results` (JSON text).
    pub fn render(&self, query_results: &str, context: Option<&str>) -> DbResult<String> {
        let results: JsonValue = serde_json::from_str(query_results).map_err(|e| {
            DbError::invalid_input(format!("query_results must be valid JSON: {}", e))
        })?;

        if !has_rows(&results) {
            return Ok(EMPTY_RESULTS_TEXT.to_string());
        }

        let pretty = serde_json::to_string_pretty(&results)
            .map_err(|e| DbError::internal(format!("Failed to serialize query results: {}", e)))?;

        let mut lines: Vec<String> = vec![self.opening().to_string(), String::new()];
        lines.push("Requirements:".to_string());
        lines.extend(
            self.requirements()
                .iter()
                .enumerate()
                .map(|(i, req)| format!("{}. {}", i + 1, req)),
        );
        lines.push(String::new());

        if let Some(context) = context.filter(|c| !c.is_empty()) {
            lines.push(format!("{}: {}", self.context_label(), context));
            lines.push(String::new());
        }

        lines.push("Data to format:".to_string());
        lines.push("```json".to_string());
        lines.push(pretty);
        lines.push("```".to_string());
        lines.push(String::new());
        lines.push(self.closing().to_string());

        Ok(lines.join("\n"))
    }
}

fn has_rows(results: &JsonValue) -> bool {
    match results.get("rows") {
        Some(JsonValue::Array(rows)) => !rows.is_empty(),
        _ => false,
    }
}
