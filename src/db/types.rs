//! Database-agnostic type mappings.
//!
//! This module maps driver rows onto the JSON value model used by the rest of
//! the server.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Database-specific decoders handle the actual value extraction
//!
//! Values that cannot be decoded into a richer type fall back to their text
//! form, and finally to null. Decoding never fails a query.

use crate::models::{DatabaseType, Row};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row as _, Type, TypeInfo};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Temporal,
    Binary,
    Json,
    Unknown,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if db == DatabaseType::SQLite && lower == "numeric" {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    // Dates and times, before integers so "interval"/"point" stay out of them
    if lower.starts_with("time") || lower.contains("date") {
        return TypeCategory::Temporal;
    }
    if lower == "interval" || lower.contains("point") {
        return TypeCategory::Unknown;
    }

    // Integer types
    if lower.contains("int") || lower.contains("serial") || lower.contains("tiny") {
        return TypeCategory::Integer;
    }

    // Boolean
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    // Float types
    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    // JSON types
    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    // Binary types
    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    // Text and everything else (varchar, char, uuid, enum, ...)
    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Shared Value Helpers
// =============================================================================

/// Decode binary data to a JSON string: UTF-8 text when valid, base64 otherwise.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

fn text_value<E>(result: Result<Option<String>, E>) -> Option<JsonValue> {
    match result {
        Ok(Some(s)) => Some(JsonValue::String(s)),
        Ok(None) => Some(JsonValue::Null),
        Err(_) => None,
    }
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to ordered JSON maps.
pub trait RowToJson {
    /// Column name to value, in result-metadata order.
    fn to_row(&self) -> Row;
}

impl RowToJson for MySqlRow {
    fn to_row(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DatabaseType::MySQL);
                let value = mysql::decode_column(self, idx, type_name, category);
                (col.name().to_string(), value)
            })
            .collect()
    }
}

impl RowToJson for PgRow {
    fn to_row(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DatabaseType::PostgreSQL);
                let value = postgres::decode_column(self, idx, type_name, category);
                (col.name().to_string(), value)
            })
            .collect()
    }
}

impl RowToJson for SqliteRow {
    fn to_row(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DatabaseType::SQLite);
                let value = sqlite::decode_column(self, idx, type_name, category);
                (col.name().to_string(), value)
            })
            .collect()
    }
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;

    pub fn decode_column(
        row: &MySqlRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        match category {
            TypeCategory::Decimal => decode_decimal(row, idx),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Temporal => decode_temporal(row, idx, type_name),
            TypeCategory::Binary => decode_binary_col(row, idx),
            TypeCategory::Json => decode_json(row, idx),
            TypeCategory::Unknown => decode_text(row, idx),
        }
    }

    fn decode_decimal(row: &MySqlRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<RawDecimal>, _>(idx) {
            Ok(Some(v)) => JsonValue::String(v.0),
            Ok(None) => JsonValue::Null,
            Err(e) => {
                tracing::debug!(error = ?e, "Failed to decode DECIMAL, using text form");
                decode_text(row, idx)
            }
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
        // Check NULL first
        if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Null;
        }
        if let Ok(Some(v)) = row.try_get::<Option<i8>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u8>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<u64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        decode_text(row, idx)
    }

    fn decode_boolean(row: &MySqlRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<bool>, _>(idx) {
            Ok(Some(v)) => JsonValue::Bool(v),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_integer(row, idx),
        }
    }

    fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return float_value(v as f64);
        }
        decode_text(row, idx)
    }

    fn decode_temporal(row: &MySqlRow, idx: usize, type_name: &str) -> JsonValue {
        let decoded = match type_name.to_lowercase().as_str() {
            "timestamp" => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)
                .map(|v| v.map(|t| t.to_rfc3339())),
            "datetime" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)
                .map(|v| v.map(|t| t.to_string())),
            "date" => row
                .try_get::<Option<NaiveDate>, _>(idx)
                .map(|v| v.map(|t| t.to_string())),
            "time" => row
                .try_get::<Option<NaiveTime>, _>(idx)
                .map(|v| v.map(|t| t.to_string())),
            _ => return decode_text(row, idx),
        };
        text_value(decoded).unwrap_or_else(|| decode_text(row, idx))
    }

    fn decode_binary_col(row: &MySqlRow, idx: usize) -> JsonValue {
        row.try_get::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| decode_binary_value(&v))
            .unwrap_or(JsonValue::Null)
    }

    fn decode_json(row: &MySqlRow, idx: usize) -> JsonValue {
        row.try_get::<Option<serde_json::Value>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null)
    }

    fn decode_text(row: &MySqlRow, idx: usize) -> JsonValue {
        text_value(row.try_get::<Option<String>, _>(idx))
            .or_else(|| text_value(row.try_get_unchecked::<Option<String>, _>(idx)))
            .unwrap_or(JsonValue::Null)
    }
}

mod postgres {
    use super::*;

    pub fn decode_column(
        row: &PgRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        match category {
            TypeCategory::Decimal => decode_decimal(row, idx),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Temporal => decode_temporal(row, idx, type_name),
            TypeCategory::Binary => decode_binary_col(row, idx),
            TypeCategory::Json => decode_json(row, idx),
            TypeCategory::Unknown => decode_text(row, idx),
        }
    }

    fn decode_decimal(row: &PgRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<RawDecimal>, _>(idx) {
            Ok(Some(v)) => JsonValue::String(v.0),
            Ok(None) => JsonValue::Null,
            Err(e) => {
                tracing::debug!(error = ?e, "Failed to decode NUMERIC, using text form");
                decode_text(row, idx)
            }
        }
    }

    fn decode_integer(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(None) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Null;
        }
        if let Ok(Some(v)) = row.try_get::<Option<i16>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i32>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        decode_text(row, idx)
    }

    fn decode_boolean(row: &PgRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<bool>, _>(idx) {
            Ok(Some(v)) => JsonValue::Bool(v),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_text(row, idx),
        }
    }

    fn decode_float(row: &PgRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<f32>, _>(idx) {
            return float_value(v as f64);
        }
        decode_text(row, idx)
    }

    fn decode_temporal(row: &PgRow, idx: usize, type_name: &str) -> JsonValue {
        let decoded = match type_name.to_lowercase().as_str() {
            "timestamptz" => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)
                .map(|v| v.map(|t| t.to_rfc3339())),
            "timestamp" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)
                .map(|v| v.map(|t| t.to_string())),
            "date" => row
                .try_get::<Option<NaiveDate>, _>(idx)
                .map(|v| v.map(|t| t.to_string())),
            "time" => row
                .try_get::<Option<NaiveTime>, _>(idx)
                .map(|v| v.map(|t| t.to_string())),
            _ => return decode_text(row, idx),
        };
        text_value(decoded).unwrap_or_else(|| decode_text(row, idx))
    }

    fn decode_binary_col(row: &PgRow, idx: usize) -> JsonValue {
        row.try_get::<Option<Vec<u8>>, _>(idx)
            .ok()
            .flatten()
            .map(|v| decode_binary_value(&v))
            .unwrap_or(JsonValue::Null)
    }

    fn decode_json(row: &PgRow, idx: usize) -> JsonValue {
        row.try_get::<Option<serde_json::Value>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(JsonValue::Null)
    }

    /// Raw SQL runs over the simple query protocol, so any value can be read
    /// back in its text form (uuid, interval, arrays, enums).
    fn decode_text(row: &PgRow, idx: usize) -> JsonValue {
        text_value(row.try_get::<Option<String>, _>(idx))
            .or_else(|| text_value(row.try_get_unchecked::<Option<String>, _>(idx)))
            .unwrap_or(JsonValue::Null)
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(
        row: &SqliteRow,
        idx: usize,
        type_name: &str,
        category: TypeCategory,
    ) -> JsonValue {
        match category {
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => decode_boolean(row, idx),
            TypeCategory::Float | TypeCategory::Decimal => decode_float(row, idx),
            TypeCategory::Binary => decode_binary_col(row, idx),
            _ => decode_text(row, idx, type_name),
        }
    }

    fn decode_integer(row: &SqliteRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<i64>, _>(idx) {
            Ok(Some(v)) => JsonValue::Number(v.into()),
            Ok(None) => JsonValue::Null,
            // Dynamic typing: an INTEGER column may hold any storage class.
            Err(_) => decode_dynamic(row, idx),
        }
    }

    fn decode_boolean(row: &SqliteRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<bool>, _>(idx) {
            Ok(Some(v)) => JsonValue::Bool(v),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_dynamic(row, idx),
        }
    }

    fn decode_float(row: &SqliteRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<f64>, _>(idx) {
            Ok(Some(v)) => float_value(v),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_dynamic(row, idx),
        }
    }

    fn decode_binary_col(row: &SqliteRow, idx: usize) -> JsonValue {
        match row.try_get::<Option<Vec<u8>>, _>(idx) {
            Ok(Some(v)) => decode_binary_value(&v),
            Ok(None) => JsonValue::Null,
            Err(_) => decode_dynamic(row, idx),
        }
    }

    fn decode_text(row: &SqliteRow, idx: usize, type_name: &str) -> JsonValue {
        match row.try_get::<Option<String>, _>(idx) {
            Ok(Some(v)) => {
                if type_name.to_lowercase().contains("json") {
                    if let Ok(json) = serde_json::from_str::<JsonValue>(&v) {
                        return json;
                    }
                }
                JsonValue::String(v)
            }
            Ok(None) => JsonValue::Null,
            Err(_) => decode_dynamic(row, idx),
        }
    }

    /// Try each storage class in turn.
    fn decode_dynamic(row: &SqliteRow, idx: usize) -> JsonValue {
        if let Ok(Some(v)) = row.try_get::<Option<i64>, _>(idx) {
            return JsonValue::Number(v.into());
        }
        if let Ok(Some(v)) = row.try_get::<Option<f64>, _>(idx) {
            return float_value(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<String>, _>(idx) {
            return JsonValue::String(v);
        }
        if let Ok(Some(v)) = row.try_get::<Option<Vec<u8>>, _>(idx) {
            return decode_binary_value(&v);
        }
        JsonValue::Null
    }
}
