//! MCP service implementation using rmcp.
//!
//! [`EchoDbService`] exposes the read-only database tools and the prompt
//! templates through rmcp's tool and prompt routers.

use crate::db::ConnectionManager;
use crate::models::{
    ConnectionInfo, DatabaseSchema, ExecuteQueryInput, ExecuteQueryOutput, TableSampleInput,
};
use crate::prompts::{
    FormatComparisonTableArgs, FormatSummaryTableArgs, FormatTableArgs, SystemPromptArgs,
    TableTemplate, system_prompt, system_prompt_from_text,
};
use crate::tools::{
    ConnectToolHandler, QueryOrchestrator, QueryToolHandler, SampleToolHandler, SchemaToolHandler,
};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::router::prompt::PromptRouter,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
        PaginatedRequestParam, PromptMessage, PromptMessageRole, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct EchoDbService {
    /// Shared connection manager for the served database
    connection_manager: Arc<ConnectionManager>,
    /// Guard, row limit and truncation shared by every query path
    orchestrator: QueryOrchestrator,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
    /// Prompt router for MCP prompt dispatch (auto-generated)
    prompt_router: PromptRouter<Self>,
}

impl EchoDbService {
    /// Create a service over `connection_manager` returning at most
    /// `max_rows` rows per query.
    pub fn new(connection_manager: Arc<ConnectionManager>, max_rows: usize) -> Self {
        Self {
            connection_manager,
            orchestrator: QueryOrchestrator::new(max_rows),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        &self.connection_manager
    }

    fn template_result(
        template: TableTemplate,
        query_results: &str,
        context: Option<&str>,
    ) -> Result<GetPromptResult, McpError> {
        let text = template.render(query_results, context)?;
        Ok(GetPromptResult {
            description: Some(template.description().to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

#[tool_router]
impl EchoDbService {
    #[tool(
        description = "Test the connection to the configured database.\nRuns SELECT 1 and returns the database type and server version."
    )]
    async fn connect_database(&self) -> Result<Json<ConnectionInfo>, McpError> {
        let handler = ConnectToolHandler::new(self.connection_manager.clone());
        handler
            .connect_database()
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Get the database schema.\nReturns every table with its columns (name, type, primary_key, nullable, default), primary keys, foreign keys and indexes.\nCall this before writing queries."
    )]
    async fn get_schema(&self) -> Result<Json<DatabaseSchema>, McpError> {
        let handler = SchemaToolHandler::new(self.connection_manager.clone());
        handler.get_schema().await.map(Json).map_err(McpError::from)
    }

    #[tool(
        description = "Get sample rows from a table to inspect real data formats.\nlimit: 1-100, default 5. Returns a markdown table (or key: value lines for a single row)."
    )]
    async fn get_table_sample(
        &self,
        Parameters(input): Parameters<TableSampleInput>,
    ) -> Result<String, McpError> {
        let handler = SampleToolHandler::new(self.connection_manager.clone(), self.orchestrator);
        handler
            .get_table_sample(input)
            .await
            .map_err(McpError::from)
    }

    #[tool(
        description = "Execute a read-only SQL query.\nOnly a single SELECT or WITH ... SELECT statement is accepted; INSERT, UPDATE, DELETE, DROP, ALTER, CREATE, TRUNCATE, GRANT and REVOKE are rejected.\nResults beyond the server row limit are truncated with a note."
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Result<Json<ExecuteQueryOutput>, McpError> {
        let handler = QueryToolHandler::new(self.connection_manager.clone(), self.orchestrator);
        handler
            .execute_query(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }
}

#[prompt_router]
impl EchoDbService {
    /// Formats database query results as a well-structured markdown table.
    #[prompt(name = "format_table")]
    async fn format_table(
        &self,
        Parameters(args): Parameters<FormatTableArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Self::template_result(
            TableTemplate::Table,
            &args.query_results,
            args.table_title.as_deref(),
        )
    }

    /// Creates a summary statistics table from aggregated query results.
    #[prompt(name = "format_summary_table")]
    async fn format_summary_table(
        &self,
        Parameters(args): Parameters<FormatSummaryTableArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Self::template_result(
            TableTemplate::Summary,
            &args.query_results,
            args.summary_type.as_deref(),
        )
    }

    /// Creates a side-by-side comparison table from query results.
    #[prompt(name = "format_comparison_table")]
    async fn format_comparison_table(
        &self,
        Parameters(args): Parameters<FormatComparisonTableArgs>,
    ) -> Result<GetPromptResult, McpError> {
        Self::template_result(
            TableTemplate::Comparison,
            &args.query_results,
            args.comparison_dimension.as_deref(),
        )
    }

    /// The EchoDB agent system prompt, optionally embedding a database schema.
    #[prompt(name = "system_prompt")]
    async fn system_prompt(
        &self,
        Parameters(args): Parameters<SystemPromptArgs>,
    ) -> Result<GetPromptResult, McpError> {
        let text = system_prompt_from_text(args.schema.as_deref())?;
        Ok(GetPromptResult {
            description: Some("EchoDB agent system prompt".to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for EchoDbService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "echodb-mcp".to_owned(),
                title: Some("EchoDB MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(system_prompt(None)),
        }
    }
}
