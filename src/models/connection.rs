//! Connection-related data models.
//!
//! This module defines types for database connection configuration and state.

use crate::config::PoolOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    PostgreSQL,
    /// Includes MariaDB
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Parse database type from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if lower.starts_with("mysql://") || lower.starts_with("mariadb://") {
            Some(Self::MySQL)
        } else if lower.starts_with("sqlite://") || lower.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    /// Get the display name for this database type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
        }
    }

    /// Quote a single identifier part in this dialect.
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Self::MySQL => format!("`{}`", ident.replace('`', "``")),
            Self::PostgreSQL | Self::SQLite => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuration for the served database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub db_type: DatabaseType,
    /// Contains sensitive data - never log
    #[serde(skip_serializing)]
    pub connection_string: String,
    /// Connection pool configuration options.
    #[serde(default)]
    pub pool_options: PoolOptions,
}

impl ConnectionConfig {
    /// Create a new connection configuration.
    pub fn new(
        connection_string: impl Into<String>,
        pool_options: PoolOptions,
    ) -> Result<Self, ConnectionConfigError> {
        let connection_string = connection_string.into();

        let db_type = DatabaseType::from_connection_string(&connection_string)
            .ok_or_else(|| ConnectionConfigError::UnknownDatabaseType(connection_string.clone()))?;

        Ok(Self {
            db_type,
            connection_string,
            pool_options,
        })
    }

    /// Get a display-safe version of the connection string (credentials masked).
    pub fn masked_connection_string(&self) -> String {
        let s = &self.connection_string;
        let userinfo_start = s.find("://").map(|p| p + 3).unwrap_or(0);
        if let Some(at_pos) = s[userinfo_start..].find('@').map(|p| p + userinfo_start) {
            if let Some(colon_pos) = s[userinfo_start..at_pos].find(':').map(|p| p + userinfo_start) {
                return format!("{}****{}", &s[..colon_pos + 1], &s[at_pos..]);
            }
        }
        s.clone()
    }
}

/// Errors that can occur when creating a connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionConfigError {
    /// Could not determine database type from connection string
    #[error("Unknown database type in connection string: {0}")]
    UnknownDatabaseType(String),
}

/// Result of a successful connectivity check.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ConnectionInfo {
    /// Always "connected"
    pub status: String,
    pub database_type: DatabaseType,
    pub server_version: Option<String>,
}

impl ConnectionInfo {
    pub fn connected(database_type: DatabaseType, server_version: Option<String>) -> Self {
        Self {
            status: "connected".to_string(),
            database_type,
            server_version,
        }
    }
}
