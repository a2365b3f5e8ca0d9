//! MCP prompt templates.
//!
//! - `templates`: table formatting prompts over `execute_query` results
//! - `system`: the EchoDB agent system prompt

pub mod system;
pub mod templates;

use schemars::JsonSchema;
use serde::Deserialize;

pub use system::{system_prompt, system_prompt_from_text};
pub use templates::{EMPTY_RESULTS_TEXT, TableTemplate};

/// Arguments for `format_table`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FormatTableArgs {
    /// The JSON data from execute_query containing rows of data
    pub query_results: String,
    /// Optional title for the table
    #[serde(default)]
    pub table_title: Option<String>,
}

/// Arguments for `format_summary_table`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FormatSummaryTableArgs {
    /// The JSON data from execute_query containing aggregated data
    pub query_results: String,
    /// Type of summary (e.g. 'sales', 'users', 'products')
    #[serde(default)]
    pub summary_type: Option<String>,
}

/// Arguments for `format_comparison_table`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FormatComparisonTableArgs {
    /// The JSON data from execute_query containing comparison data
    pub query_results: String,
    /// What is being compared (e.g. 'time_periods', 'categories', 'regions')
    #[serde(default)]
    pub comparison_dimension: Option<String>,
}

/// Arguments for `system_prompt`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SystemPromptArgs {
    /// Database schema as JSON text, usually the output of get_schema
    #[serde(default)]
    pub schema: Option<String>,
}
