//! Schema introspection module.
//!
//! This module provides database schema introspection functionality
//! for SQLite, PostgreSQL, and MySQL databases.
//!
//! # Architecture
//!
//! SQL queries are organized in the `queries` submodule with constants for each
//! database type. Database-specific implementations are in their respective
//! submodules (postgres, mysql, sqlite), each providing the same interface.
//! Only base tables of the connection's default schema are reported.

use crate::db::pool::DbPool;
use crate::error::{DbError, DbResult};
use crate::models::{ColumnDefinition, DatabaseSchema, ForeignKey, IndexInfo, TableSchema};
use tracing::debug;

/// Schema inspector for database introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// List the names of all user tables.
    pub async fn list_tables(pool: &DbPool) -> DbResult<Vec<String>> {
        match pool {
            DbPool::Postgres(p) => postgres::list_tables(p).await,
            DbPool::MySql(p) => mysql::list_tables(p).await,
            DbPool::SQLite(p) => sqlite::list_tables(p).await,
        }
    }

    /// Describe a table's columns, keys and indexes.
    pub async fn describe_table(pool: &DbPool, table_name: &str) -> DbResult<TableSchema> {
        let table = match pool {
            DbPool::Postgres(p) => postgres::describe_table(p, table_name).await?,
            DbPool::MySql(p) => mysql::describe_table(p, table_name).await?,
            DbPool::SQLite(p) => sqlite::describe_table(p, table_name).await?,
        };
        if table.columns.is_empty() {
            return Err(DbError::schema(
                format!("Table '{}' not found", table_name),
                table_name.to_string(),
            ));
        }
        Ok(table)
    }

    /// Describe every user table in the database.
    pub async fn database_schema(pool: &DbPool) -> DbResult<DatabaseSchema> {
        let mut schema = DatabaseSchema::default();
        for name in Self::list_tables(pool).await? {
            let table = Self::describe_table(pool, &name).await?;
            schema.tables.insert(name, table);
        }
        debug!(tables = schema.tables.len(), "Inspected database schema");
        Ok(schema)
    }
}

/// One column pair of a foreign key constraint, as returned by the catalogs.
#[derive(Debug, Clone)]
struct ForeignKeyColumn {
    constraint: String,
    column: String,
    referred_table: String,
    referred_column: String,
}

/// Fold per-column rows into one entry per constraint, keeping catalog order.
fn group_foreign_keys(rows: Vec<ForeignKeyColumn>) -> Vec<ForeignKey> {
    let mut keys: Vec<(String, ForeignKey)> = Vec::new();
    for row in rows {
        match keys.iter_mut().find(|(name, _)| *name == row.constraint) {
            Some((_, fk)) => {
                fk.constrained_columns.push(row.column);
                fk.referred_columns.push(row.referred_column);
            }
            None => keys.push((
                row.constraint,
                ForeignKey::new(row.referred_table).with_pair(row.column, row.referred_column),
            )),
        }
    }
    keys.into_iter().map(|(_, fk)| fk).collect()
}

// =============================================================================
// SQL Query Templates
// =============================================================================
//
// Centralized SQL queries for schema introspection. Each database has its own
// submodule with queries adapted to its specific system catalogs.

mod queries {
    pub mod postgres {
        pub const LIST_TABLES: &str = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = current_schema()
            AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT
            c.column_name::text AS column_name,
            format_type(a.atttypid, a.atttypmod) AS column_type,
            c.is_nullable::text AS is_nullable,
            c.column_default::text AS column_default
        FROM information_schema.columns c
        JOIN pg_class t ON t.relname = c.table_name
        JOIN pg_namespace n ON n.oid = t.relnamespace AND n.nspname = c.table_schema
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attname = c.column_name
        WHERE c.table_name = $1 AND c.table_schema = current_schema()
        ORDER BY c.ordinal_position
        "#;

        pub const DESCRIBE_PRIMARY_KEY: &str = r#"
        SELECT kcu.column_name::text AS column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
        WHERE tc.table_name = $1
        AND tc.table_schema = current_schema()
        AND tc.constraint_type = 'PRIMARY KEY'
        ORDER BY kcu.ordinal_position
        "#;

        pub const DESCRIBE_FOREIGN_KEYS: &str = r#"
        SELECT
            con.conname::text AS constraint_name,
            att.attname::text AS column_name,
            ref_cls.relname::text AS foreign_table_name,
            ref_att.attname::text AS foreign_column_name
        FROM pg_constraint con
        JOIN pg_class cls ON cls.oid = con.conrelid
        JOIN pg_namespace nsp ON nsp.oid = cls.relnamespace
        JOIN pg_class ref_cls ON ref_cls.oid = con.confrelid
        CROSS JOIN LATERAL unnest(con.conkey, con.confkey) WITH ORDINALITY AS k(attnum, ref_attnum, ord)
        JOIN pg_attribute att ON att.attrelid = con.conrelid AND att.attnum = k.attnum
        JOIN pg_attribute ref_att ON ref_att.attrelid = con.confrelid AND ref_att.attnum = k.ref_attnum
        WHERE con.contype = 'f'
        AND cls.relname = $1
        AND nsp.nspname = current_schema()
        ORDER BY con.conname, k.ord
        "#;

        pub const DESCRIBE_INDEXES: &str = r#"
        SELECT
            i.relname::text AS index_name,
            array_agg(a.attname::text ORDER BY array_position(ix.indkey, a.attnum)) AS column_names,
            ix.indisunique AS is_unique
        FROM pg_index ix
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
        WHERE t.relname = $1
        AND n.nspname = current_schema()
        AND NOT ix.indisprimary
        GROUP BY i.relname, ix.indisunique
        ORDER BY i.relname
        "#;
    }

    pub mod mysql {
        pub const LIST_TABLES: &str = r#"
            SELECT CONVERT(TABLE_NAME USING utf8) AS TABLE_NAME
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
            "#;

        pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT
            CONVERT(COLUMN_NAME USING utf8) AS COLUMN_NAME,
            CONVERT(COLUMN_TYPE USING utf8) AS COLUMN_TYPE,
            CONVERT(IS_NULLABLE USING utf8) AS IS_NULLABLE,
            CONVERT(COLUMN_DEFAULT USING utf8) AS COLUMN_DEFAULT,
            CONVERT(COLUMN_KEY USING utf8) AS COLUMN_KEY
        FROM information_schema.columns
        WHERE TABLE_NAME = ? AND TABLE_SCHEMA = DATABASE()
        ORDER BY ORDINAL_POSITION
        "#;

        pub const DESCRIBE_FOREIGN_KEYS: &str = r#"
        SELECT
            CONVERT(CONSTRAINT_NAME USING utf8) AS CONSTRAINT_NAME,
            CONVERT(COLUMN_NAME USING utf8) AS COLUMN_NAME,
            CONVERT(REFERENCED_TABLE_NAME USING utf8) AS REFERENCED_TABLE_NAME,
            CONVERT(REFERENCED_COLUMN_NAME USING utf8) AS REFERENCED_COLUMN_NAME
        FROM information_schema.KEY_COLUMN_USAGE
        WHERE TABLE_NAME = ?
        AND TABLE_SCHEMA = DATABASE()
        AND REFERENCED_TABLE_NAME IS NOT NULL
        ORDER BY CONSTRAINT_NAME, ORDINAL_POSITION
        "#;

        pub const DESCRIBE_INDEXES: &str = r#"
        SELECT
            CONVERT(INDEX_NAME USING utf8) AS INDEX_NAME,
            CONVERT(GROUP_CONCAT(COLUMN_NAME ORDER BY SEQ_IN_INDEX) USING utf8) AS COLUMN_NAMES,
            NOT NON_UNIQUE AS IS_UNIQUE
        FROM information_schema.STATISTICS
        WHERE TABLE_NAME = ? AND TABLE_SCHEMA = DATABASE()
        AND INDEX_NAME <> 'PRIMARY'
        GROUP BY INDEX_NAME, NON_UNIQUE
        ORDER BY INDEX_NAME
        "#;
    }

    pub mod sqlite {
        pub const LIST_TABLES: &str = r#"
            SELECT name FROM sqlite_master
            WHERE type = 'table'
            AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#;

        pub const TABLE_INFO: &str =
            r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#;

        pub const FOREIGN_KEY_LIST: &str = r#"SELECT id, "table", "from", "to" FROM pragma_foreign_key_list(?1) ORDER BY id, seq"#;

        pub const INDEX_LIST: &str =
            r#"SELECT name, "unique", origin FROM pragma_index_list(?1) ORDER BY name"#;

        pub const INDEX_INFO: &str = r#"SELECT name FROM pragma_index_info(?1) ORDER BY seqno"#;
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

mod postgres {
    use super::*;
    use sqlx::{PgPool, Row};

    pub async fn list_tables(pool: &PgPool) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::postgres::LIST_TABLES)
            .fetch_all(pool)
            .await?;
        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = tables.len(), "Listed PostgreSQL tables");
        Ok(tables)
    }

    pub async fn describe_table(pool: &PgPool, table_name: &str) -> DbResult<TableSchema> {
        let columns = fetch_columns(pool, table_name).await?;
        let primary_keys = fetch_primary_key(pool, table_name).await?;
        let foreign_keys = fetch_foreign_keys(pool, table_name).await?;
        let indexes = fetch_indexes(pool, table_name).await;

        Ok(TableSchema {
            columns,
            foreign_keys,
            indexes,
            ..Default::default()
        }
        .with_primary_keys(primary_keys))
    }

    async fn fetch_columns(pool: &PgPool, table_name: &str) -> DbResult<Vec<ColumnDefinition>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_COLUMNS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("column_name")?;
                let column_type: String = row.try_get("column_type")?;
                let nullable: String = row.try_get("is_nullable")?;
                let default_value: Option<String> = row.try_get("column_default")?;
                Ok(ColumnDefinition::new(name, column_type, nullable == "YES")
                    .with_default(default_value))
            })
            .collect()
    }

    async fn fetch_primary_key(pool: &PgPool, table_name: &str) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_PRIMARY_KEY)
            .bind(table_name)
            .fetch_all(pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| row.try_get::<String, _>("column_name"))
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn fetch_foreign_keys(pool: &PgPool, table_name: &str) -> DbResult<Vec<ForeignKey>> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_FOREIGN_KEYS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        let columns = rows
            .iter()
            .map(|row| {
                Ok(ForeignKeyColumn {
                    constraint: row.try_get("constraint_name")?,
                    column: row.try_get("column_name")?,
                    referred_table: row.try_get("foreign_table_name")?,
                    referred_column: row.try_get("foreign_column_name")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(group_foreign_keys(columns))
    }

    async fn fetch_indexes(pool: &PgPool, table_name: &str) -> Vec<IndexInfo> {
        let rows = sqlx::query(queries::postgres::DESCRIBE_INDEXES)
            .bind(table_name)
            .fetch_all(pool)
            .await
            .unwrap_or_default();

        rows.iter()
            .filter_map(|row| {
                let name: String = row.try_get("index_name").ok()?;
                let columns: Vec<String> = row.try_get("column_names").ok()?;
                let is_unique: bool = row.try_get("is_unique").unwrap_or(false);
                (!columns.is_empty()).then(|| IndexInfo::new(name, columns).with_unique(is_unique))
            })
            .collect()
    }
}

mod mysql {
    use super::*;
    use sqlx::mysql::MySqlRow;
    use sqlx::{MySqlPool, Row};

    /// Safely get a string from a MySQL row.
    /// MySQL may return VARBINARY instead of VARCHAR depending on charset configuration.
    fn get_string(row: &MySqlRow, column: &str) -> String {
        get_optional_string(row, column).unwrap_or_default()
    }

    /// Safely get an optional string from a MySQL row.
    fn get_optional_string(row: &MySqlRow, column: &str) -> Option<String> {
        row.try_get::<Option<String>, _>(column)
            .ok()
            .flatten()
            .or_else(|| {
                row.try_get::<Option<Vec<u8>>, _>(column)
                    .ok()
                    .flatten()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
            })
    }

    pub async fn list_tables(pool: &MySqlPool) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::mysql::LIST_TABLES)
            .fetch_all(pool)
            .await?;
        let tables = rows
            .iter()
            .map(|row| get_string(row, "TABLE_NAME"))
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>();
        debug!(count = tables.len(), "Listed MySQL tables");
        Ok(tables)
    }

    pub async fn describe_table(pool: &MySqlPool, table_name: &str) -> DbResult<TableSchema> {
        let rows = sqlx::query(queries::mysql::DESCRIBE_COLUMNS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        let mut primary_keys = Vec::new();
        let columns = rows
            .iter()
            .map(|row| {
                let name = get_string(row, "COLUMN_NAME");
                if get_string(row, "COLUMN_KEY") == "PRI" {
                    primary_keys.push(name.clone());
                }
                ColumnDefinition::new(
                    name,
                    get_string(row, "COLUMN_TYPE"),
                    get_string(row, "IS_NULLABLE") == "YES",
                )
                .with_default(get_optional_string(row, "COLUMN_DEFAULT"))
            })
            .collect::<Vec<_>>();

        let foreign_keys = fetch_foreign_keys(pool, table_name).await?;
        let indexes = fetch_indexes(pool, table_name).await;

        Ok(TableSchema {
            columns,
            foreign_keys,
            indexes,
            ..Default::default()
        }
        .with_primary_keys(primary_keys))
    }

    async fn fetch_foreign_keys(pool: &MySqlPool, table_name: &str) -> DbResult<Vec<ForeignKey>> {
        let rows = sqlx::query(queries::mysql::DESCRIBE_FOREIGN_KEYS)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        let columns = rows
            .iter()
            .map(|row| ForeignKeyColumn {
                constraint: get_string(row, "CONSTRAINT_NAME"),
                column: get_string(row, "COLUMN_NAME"),
                referred_table: get_string(row, "REFERENCED_TABLE_NAME"),
                referred_column: get_string(row, "REFERENCED_COLUMN_NAME"),
            })
            .collect();
        Ok(group_foreign_keys(columns))
    }

    async fn fetch_indexes(pool: &MySqlPool, table_name: &str) -> Vec<IndexInfo> {
        let rows = sqlx::query(queries::mysql::DESCRIBE_INDEXES)
            .bind(table_name)
            .fetch_all(pool)
            .await
            .unwrap_or_default();

        rows.iter()
            .map(|row| {
                let name = get_string(row, "INDEX_NAME");
                let columns: Vec<String> = get_string(row, "COLUMN_NAMES")
                    .split(',')
                    .map(|s| s.to_string())
                    .collect();
                let is_unique: i64 = row.try_get("IS_UNIQUE").unwrap_or(0);
                IndexInfo::new(name, columns).with_unique(is_unique != 0)
            })
            .collect()
    }
}

mod sqlite {
    use super::*;
    use sqlx::{Row, SqlitePool};

    pub async fn list_tables(pool: &SqlitePool) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::sqlite::LIST_TABLES)
            .fetch_all(pool)
            .await?;
        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = tables.len(), "Listed SQLite tables");
        Ok(tables)
    }

    pub async fn describe_table(pool: &SqlitePool, table_name: &str) -> DbResult<TableSchema> {
        let (columns, primary_keys) = fetch_columns(pool, table_name).await?;
        let foreign_keys = fetch_foreign_keys(pool, table_name).await?;
        let indexes = fetch_indexes(pool, table_name).await;

        Ok(TableSchema {
            columns,
            foreign_keys,
            indexes,
            ..Default::default()
        }
        .with_primary_keys(primary_keys))
    }

    /// Columns plus primary key columns in key order.
    async fn fetch_columns(
        pool: &SqlitePool,
        table_name: &str,
    ) -> DbResult<(Vec<ColumnDefinition>, Vec<String>)> {
        let rows = sqlx::query(queries::sqlite::TABLE_INFO)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        let mut keyed: Vec<(i64, String)> = Vec::new();
        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            let notnull: i64 = row.try_get("notnull")?;
            let default_value: Option<String> = row.try_get("dflt_value").ok().flatten();
            let pk: i64 = row.try_get("pk")?;

            if pk > 0 {
                keyed.push((pk, name.clone()));
            }
            columns.push(
                ColumnDefinition::new(name, data_type, notnull == 0).with_default(default_value),
            );
        }
        keyed.sort_by_key(|(pos, _)| *pos);
        Ok((columns, keyed.into_iter().map(|(_, name)| name).collect()))
    }

    async fn fetch_foreign_keys(pool: &SqlitePool, table_name: &str) -> DbResult<Vec<ForeignKey>> {
        let rows = sqlx::query(queries::sqlite::FOREIGN_KEY_LIST)
            .bind(table_name)
            .fetch_all(pool)
            .await?;

        let mut columns: Vec<ForeignKeyColumn> = Vec::with_capacity(rows.len());
        for row in &rows {
            let constraint = row.try_get::<i64, _>("id")?.to_string();
            let referred_table: String = row.try_get("table")?;
            let column: String = row.try_get("from")?;
            // NULL "to" means the referred table's primary key.
            let referred_column = match row.try_get::<Option<String>, _>("to")? {
                Some(to) => to,
                None => {
                    let position = columns
                        .iter()
                        .filter(|c| c.constraint == constraint)
                        .count();
                    let (_, referred_pk) = fetch_columns(pool, &referred_table).await?;
                    referred_pk.into_iter().nth(position).unwrap_or_default()
                }
            };
            columns.push(ForeignKeyColumn {
                constraint,
                column,
                referred_table,
                referred_column,
            });
        }
        Ok(group_foreign_keys(columns))
    }

    async fn fetch_indexes(pool: &SqlitePool, table_name: &str) -> Vec<IndexInfo> {
        let idx_list = sqlx::query(queries::sqlite::INDEX_LIST)
            .bind(table_name)
            .fetch_all(pool)
            .await
            .unwrap_or_default();

        let mut indexes = Vec::new();
        for idx_row in &idx_list {
            let Ok(name) = idx_row.try_get::<String, _>("name") else {
                continue;
            };
            let origin: String = idx_row.try_get("origin").unwrap_or_default();
            // Primary key indexes are reported through primary_keys.
            if origin == "pk" {
                continue;
            }
            let is_unique: i64 = idx_row.try_get("unique").unwrap_or(0);

            let columns = fetch_index_columns(pool, &name).await;
            if !columns.is_empty() {
                indexes.push(IndexInfo::new(name, columns).with_unique(is_unique != 0));
            }
        }
        indexes
    }

    async fn fetch_index_columns(pool: &SqlitePool, index_name: &str) -> Vec<String> {
        sqlx::query(queries::sqlite::INDEX_INFO)
            .bind(index_name)
            .fetch_all(pool)
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|row| row.try_get::<Option<String>, _>("name").ok().flatten())
            .collect()
    }
}
