//! Integration tests for the database tools against a SQLite file.
//!
//! Tests verify that:
//! - connect_database reports the engine and version
//! - get_schema reports columns, primary keys, foreign keys and unique indexes
//! - execute_query truncates, renders and rejects writes
//! - get_table_sample validates its limit before touching the database
//! - the read session itself refuses writes

use echodb_mcp::config::PoolOptions;
use echodb_mcp::db::{ConnectionManager, SqlRunner};
use echodb_mcp::error::DbError;
use echodb_mcp::models::{ConnectionConfig, DatabaseType, ExecuteQueryInput, TableSampleInput};
use echodb_mcp::tools::{
    ConnectToolHandler, QueryOrchestrator, QueryToolHandler, SampleToolHandler, SchemaToolHandler,
};
use serde_json::json;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

/// Seed a database file with a writable pool, then open it through the
/// read-only connection manager.
async fn setup_db() -> (TempDir, Arc<ConnectionManager>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");

    let seed = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await
        .unwrap();
    for stmt in [
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            status TEXT DEFAULT 'active'
        )",
        "CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            total REAL,
            note TEXT
        )",
        "CREATE INDEX idx_orders_user ON orders(user_id)",
        "INSERT INTO users (id, name, email) VALUES
            (1, 'Ada', 'ada@example.com'),
            (2, 'Grace', 'grace@example.com'),
            (3, 'Linus', 'linus@example.com'),
            (4, 'Barbara', NULL),
            (5, 'Ken', 'ken@example.com')",
        "INSERT INTO orders (id, user_id, total, note) VALUES
            (1, 1, 12.5, 'first|order'),
            (2, 2, 40.0, NULL)",
    ] {
        sqlx::query(stmt).execute(&seed).await.unwrap();
    }
    seed.close().await;

    let config = ConnectionConfig::new(
        format!("sqlite:{}", path.display()),
        PoolOptions::default(),
    )
    .unwrap();
    (dir, Arc::new(ConnectionManager::new(config)))
}

#[tokio::test]
async fn test_connect_database() {
    let (_dir, manager) = setup_db().await;
    let info = ConnectToolHandler::new(manager.clone())
        .connect_database()
        .await
        .unwrap();
    assert_eq!(info.status, "connected");
    assert_eq!(info.database_type, DatabaseType::SQLite);
    assert!(info.server_version.is_some());
}

#[tokio::test]
async fn test_get_schema_reports_keys_and_indexes() {
    let (_dir, manager) = setup_db().await;
    let schema = SchemaToolHandler::new(manager).get_schema().await.unwrap();

    let names: Vec<&String> = schema.tables.keys().collect();
    assert_eq!(names, vec!["orders", "users"]);

    let users = schema.table("users").unwrap();
    assert_eq!(users.primary_keys, vec!["id"]);
    assert!(users.column("id").unwrap().primary_key);
    assert!(!users.column("name").unwrap().nullable);
    assert!(users.column("email").unwrap().nullable);
    assert_eq!(
        users.column("status").unwrap().default.as_deref(),
        Some("'active'")
    );
    assert!(
        users
            .indexes
            .iter()
            .any(|idx| idx.unique && idx.column_names == vec!["email"])
    );

    let orders = schema.table("orders").unwrap();
    assert_eq!(orders.foreign_keys.len(), 1);
    let fk = &orders.foreign_keys[0];
    assert_eq!(fk.constrained_columns, vec!["user_id"]);
    assert_eq!(fk.referred_table, "users");
    assert_eq!(fk.referred_columns, vec!["id"]);
    assert!(
        orders
            .indexes
            .iter()
            .any(|idx| idx.name == "idx_orders_user" && !idx.unique)
    );
}

#[tokio::test]
async fn test_schema_serializes_type_field() {
    let (_dir, manager) = setup_db().await;
    let schema = SchemaToolHandler::new(manager).get_schema().await.unwrap();
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value["tables"]["users"]["columns"][0]["name"], json!("id"));
    assert_eq!(value["tables"]["users"]["columns"][0]["type"], json!("INTEGER"));
}

#[tokio::test]
async fn test_execute_query_truncates() {
    let (_dir, manager) = setup_db().await;
    let handler = QueryToolHandler::new(manager, QueryOrchestrator::new(3));
    let output = handler
        .execute_query(ExecuteQueryInput {
            sql: "SELECT id, name FROM users ORDER BY id".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(output.row_count, 3);
    assert_eq!(output.rows[0]["name"], json!("Ada"));
    assert_eq!(output.note.as_deref(), Some("Result truncated to 3 rows."));
    assert!(output.formatted.starts_with("| id | name |\n| --- | --- |\n| 1 | Ada |"));
    assert!(output.presentation.contains("markdown table"));
}

#[tokio::test]
async fn test_execute_query_single_row_and_empty() {
    let (_dir, manager) = setup_db().await;
    let handler = QueryToolHandler::new(manager, QueryOrchestrator::new(100));

    let single = handler
        .execute_query(ExecuteQueryInput {
            sql: "SELECT COUNT(*) AS total FROM users;".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(single.formatted, "total: 5");
    assert!(single.note.is_none());

    let empty = handler
        .execute_query(ExecuteQueryInput {
            sql: "SELECT * FROM users WHERE id > 100".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(empty.row_count, 0);
    assert_eq!(empty.formatted, "No results found.");
}

#[tokio::test]
async fn test_execute_query_rejects_delete() {
    let (_dir, manager) = setup_db().await;
    let handler = QueryToolHandler::new(manager, QueryOrchestrator::new(100));

    let err = handler
        .execute_query(ExecuteQueryInput {
            sql: "DELETE FROM users".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Forbidden keyword detected: delete");

    let count = handler
        .execute_query(ExecuteQueryInput {
            sql: "SELECT COUNT(*) AS n FROM users".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(count.rows[0]["n"], json!(5));
}

#[tokio::test]
async fn test_execute_query_sql_error_is_execution_error() {
    let (_dir, manager) = setup_db().await;
    let handler = QueryToolHandler::new(manager, QueryOrchestrator::new(100));
    let err = handler
        .execute_query(ExecuteQueryInput {
            sql: "SELECT * FROM missing_table".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Execution { .. }));
    assert!(err.to_string().contains("missing_table"));

    let mcp: rmcp::ErrorData = err.into();
    assert_eq!(mcp.code, rmcp::model::ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn test_table_sample_renders_and_escapes() {
    let (_dir, manager) = setup_db().await;
    let handler = SampleToolHandler::new(manager, QueryOrchestrator::new(100));
    let text = handler
        .get_table_sample(TableSampleInput {
            table_name: "orders".to_string(),
            limit: 5,
        })
        .await
        .unwrap();

    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines[0], "| id | note | total | user_id |");
    assert_eq!(lines[2], "| 1 | first\\|order | 12.5 | 1 |");
    assert_eq!(lines[3], "| 2 |  | 40.0 | 2 |");
}

#[tokio::test]
async fn test_table_sample_single_row() {
    let (_dir, manager) = setup_db().await;
    let handler = SampleToolHandler::new(manager, QueryOrchestrator::new(100));
    let text = handler
        .get_table_sample(TableSampleInput {
            table_name: "users".to_string(),
            limit: 1,
        })
        .await
        .unwrap();
    assert!(text.starts_with("id: 1\nname: Ada\n"));
}

#[tokio::test]
async fn test_table_sample_appends_truncation_note() {
    let (_dir, manager) = setup_db().await;
    let handler = SampleToolHandler::new(manager, QueryOrchestrator::new(2));
    let text = handler
        .get_table_sample(TableSampleInput {
            table_name: "users".to_string(),
            limit: 5,
        })
        .await
        .unwrap();
    assert!(text.ends_with("\n\nResult truncated to 2 rows."));
}

#[tokio::test]
async fn test_table_sample_limit_checked_before_connecting() {
    let config = ConnectionConfig::new("sqlite:/nonexistent/dir/none.db", PoolOptions::default())
        .unwrap();
    let manager = Arc::new(ConnectionManager::new(config));
    let handler = SampleToolHandler::new(manager.clone(), QueryOrchestrator::new(100));

    for (limit, message) in [
        (0, "Error: limit must be at least 1"),
        (101, "Error: limit cannot exceed 100"),
    ] {
        let err = handler
            .get_table_sample(TableSampleInput {
                table_name: "users".to_string(),
                limit,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), message);
    }
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_table_sample_unknown_table() {
    let (_dir, manager) = setup_db().await;
    let handler = SampleToolHandler::new(manager, QueryOrchestrator::new(100));
    let err = handler
        .get_table_sample(TableSampleInput {
            table_name: "nope".to_string(),
            limit: 5,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Execution { .. }));
}

#[tokio::test]
async fn test_read_session_refuses_writes() {
    let (_dir, manager) = setup_db().await;
    let mut session = manager.read_session().await.unwrap();
    session.request_read_only().await.unwrap();

    let result = session
        .fetch_rows("INSERT INTO users (id, name) VALUES (6, 'Eve')")
        .await;
    assert!(result.is_err());
    drop(session);

    let handler = QueryToolHandler::new(manager, QueryOrchestrator::new(100));
    let count = handler
        .execute_query(ExecuteQueryInput {
            sql: "SELECT COUNT(*) AS n FROM users".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(count.rows[0]["n"], json!(5));
}
