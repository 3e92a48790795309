//! SQLite helper utilities for type conversion
//!
//! SQLite doesn't natively support arrays like PostgreSQL. This module
//! provides utilities to convert between Rust types and SQLite-compatible
//! formats, plus the timestamp format used across all tables.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

/// Current UTC time as an ISO-8601 string, the format stored in all
/// created_at/updated_at columns.
#[inline]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}

/// Serialize a Vec to a JSON string for SQLite storage
#[inline]
pub fn vec_to_json<T: Serialize>(v: &[T]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a JSON string from SQLite to a Vec
#[inline]
pub fn json_to_vec<T: DeserializeOwned>(s: &str) -> Vec<T> {
    serde_json::from_str(s).unwrap_or_default()
}
