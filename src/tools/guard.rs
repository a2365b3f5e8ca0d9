//! Read-only query guard.
//!
//! A lexical gate in front of every statement the server runs. It accepts a
//! single `SELECT` (or `WITH ... SELECT`) statement and rejects anything that
//! mentions a data- or schema-changing keyword.
//!
//! # Limitations
//!
//! The check is syntactic, not semantic. It does not parse SQL, so:
//! - a forbidden keyword inside a string literal or identifier is still
//!   rejected (`SELECT 'drop' AS x` fails);
//! - a `SELECT` that calls a function with side effects is not detected;
//! - a `;` inside a string literal counts as a statement separator.
//!
//! The rejection reasons are stable and returned to callers verbatim.

use crate::error::{DbError, DbResult};
use regex::Regex;
use std::sync::OnceLock;

/// Keywords that reject a statement, checked in this order.
pub const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "insert", "update", "delete", "drop", "alter", "create", "truncate", "grant", "revoke",
];

pub const REASON_BAD_SHAPE: &str = "Query must start with SELECT or WITH";
pub const REASON_MULTIPLE_STATEMENTS: &str = "Multiple statements are not allowed";

/// Outcome of checking one SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Allowed,
    Rejected(String),
}

impl Classification {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Turn a rejection into a validation error carrying the reason.
    pub fn into_result(self) -> DbResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Rejected(reason) => Err(DbError::validation(reason)),
        }
    }
}

fn keyword_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        FORBIDDEN_KEYWORDS
            .iter()
            .map(|kw| {
                let re = Regex::new(&format!(r"\b{kw}\b"))
                    .expect("keyword regex should compile");
                (*kw, re)
            })
            .collect()
    })
}

/// Classify SQL text as allowed or rejected. Pure; the same input always
/// yields the same outcome.
pub fn classify(sql: &str) -> Classification {
    let normalized = sql.trim().to_lowercase();

    if let Some((kw, _)) = keyword_patterns()
        .iter()
        .find(|(_, re)| re.is_match(&normalized))
    {
        return Classification::Rejected(format!("Forbidden keyword detected: {kw}"));
    }

    if !(normalized.starts_with("select") || normalized.starts_with("with")) {
        return Classification::Rejected(REASON_BAD_SHAPE.to_string());
    }

    if strip_trailing_semicolon(&normalized).contains(';') {
        return Classification::Rejected(REASON_MULTIPLE_STATEMENTS.to_string());
    }

    Classification::Allowed
}

/// Remove surrounding whitespace and at most one trailing `;`.
pub fn strip_trailing_semicolon(sql: &str) -> &str {
    let trimmed = sql.trim();
    trimmed
        .strip_suffix(';')
        .map(str::trim_end)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(sql: &str) -> String {
        match classify(sql) {
            Classification::Rejected(reason) => reason,
            Classification::Allowed => panic!("expected rejection for {sql:?}"),
        }
    }

    #[test]
    fn test_plain_select_allowed() {
        assert_eq!(classify("SELECT * FROM users"), Classification::Allowed);
        assert_eq!(classify("  select 1  "), Classification::Allowed);
    }

    #[test]
    fn test_with_cte_allowed() {
        let sql = "WITH recent AS (SELECT * FROM orders) SELECT count(*) FROM recent";
        assert!(classify(sql).is_allowed());
    }

    #[test]
    fn test_forbidden_keyword_reports_keyword() {
        assert_eq!(
            rejected("DELETE FROM users"),
            "Forbidden keyword detected: delete"
        );
        assert_eq!(
            rejected("select * from t; drop table t"),
            "Forbidden keyword detected: drop"
        );
    }

    #[test]
    fn test_keyword_order_is_fixed() {
        // "update" is checked before "drop" regardless of position.
        assert_eq!(
            rejected("DROP TABLE a; UPDATE b SET x = 1"),
            "Forbidden keyword detected: update"
        );
    }

    #[test]
    fn test_keyword_needs_word_boundary() {
        assert!(classify("SELECT last_update FROM t").is_allowed());
        assert!(classify("SELECT dropdown_id, created_at FROM widgets").is_allowed());
    }

    #[test]
    fn test_keyword_in_string_literal_still_rejected() {
        assert_eq!(
            rejected("SELECT 'drop' AS word"),
            "Forbidden keyword detected: drop"
        );
    }

    #[test]
    fn test_non_select_shape_rejected() {
        assert_eq!(rejected("SHOW TABLES"), REASON_BAD_SHAPE);
        assert_eq!(rejected("EXPLAIN SELECT 1"), REASON_BAD_SHAPE);
        assert_eq!(rejected(""), REASON_BAD_SHAPE);
    }

    #[test]
    fn test_trailing_semicolon_allowed() {
        assert!(classify("SELECT 1;").is_allowed());
        assert!(classify("SELECT 1 ;  ").is_allowed());
    }

    #[test]
    fn test_stacked_statements_rejected() {
        assert_eq!(rejected("SELECT 1; SELECT 2"), REASON_MULTIPLE_STATEMENTS);
        assert_eq!(rejected("SELECT 1;;"), REASON_MULTIPLE_STATEMENTS);
    }

    #[test]
    fn test_classify_is_idempotent() {
        for sql in ["SELECT 1", "DELETE FROM x", "SHOW TABLES", "SELECT 1; SELECT 2"] {
            assert_eq!(classify(sql), classify(sql));
        }
    }

    #[test]
    fn test_strip_trailing_semicolon() {
        assert_eq!(strip_trailing_semicolon("SELECT 1;"), "SELECT 1");
        assert_eq!(strip_trailing_semicolon("  SELECT 1 ;\n"), "SELECT 1");
        assert_eq!(strip_trailing_semicolon("SELECT 1"), "SELECT 1");
        assert_eq!(strip_trailing_semicolon("SELECT 1;;"), "SELECT 1;");
    }

    #[test]
    fn test_into_result_carries_reason() {
        let err = classify("TRUNCATE logs").into_result().unwrap_err();
        assert_eq!(err.to_string(), "Forbidden keyword detected: truncate");
    }
}
