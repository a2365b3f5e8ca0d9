//! Schema-related data models.
//!
//! This module defines types for database schema introspection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structure of every user table in the database, keyed by table name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseSchema {
    pub tables: BTreeMap<String, TableSchema>,
}

impl DatabaseSchema {
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TableSchema {
    pub columns: Vec<ColumnDefinition>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexInfo>,
}

impl TableSchema {
    /// Add a column definition.
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the primary key columns and flag the matching column definitions.
    pub fn with_primary_keys(mut self, columns: Vec<String>) -> Self {
        for column in &mut self.columns {
            column.primary_key = columns.contains(&column.name);
        }
        self.primary_keys = columns;
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDefinition {
    pub name: String,
    /// Full type as reported by the database (e.g., `varchar(30)`, `INTEGER`)
    #[serde(rename = "type")]
    pub data_type: String,
    pub primary_key: bool,
    pub nullable: bool,
    /// Default expression rendered as text
    pub default: Option<String>,
}

impl ColumnDefinition {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary_key: false,
            nullable,
            default: None,
        }
    }

    /// Set whether this is a primary key column.
    pub fn with_primary_key(mut self, is_pk: bool) -> Self {
        self.primary_key = is_pk;
        self
    }

    /// Set the default value. Empty defaults are treated as absent.
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default.filter(|d| !d.is_empty());
        self
    }
}

/// A foreign key constraint, one entry per constraint (composite keys keep
/// their column pairs in order).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    pub constrained_columns: Vec<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

impl ForeignKey {
    pub fn new(referred_table: impl Into<String>) -> Self {
        Self {
            referred_table: referred_table.into(),
            ..Default::default()
        }
    }

    /// Append one column pair.
    pub fn with_pair(mut self, column: impl Into<String>, referred: impl Into<String>) -> Self {
        self.constrained_columns.push(column.into());
        self.referred_columns.push(referred.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndexInfo {
    pub name: String,
    pub column_names: Vec<String>,
    pub unique: bool,
}

impl IndexInfo {
    /// Create a new index info.
    pub fn new(name: impl Into<String>, column_names: Vec<String>) -> Self {
        Self {
            name: name.into(),
            column_names,
            unique: false,
        }
    }

    /// Set whether this is a unique index.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}
