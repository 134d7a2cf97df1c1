//! Database query modules.
//!
//! - tools: Tool CRUD, filtering, checkout and return
//! - events: Tool history

pub mod events;
pub mod tools;

use chrono::{DateTime, Utc};

/// Read an RFC 3339 timestamp column.
pub(crate) fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
