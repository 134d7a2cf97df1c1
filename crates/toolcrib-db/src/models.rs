//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use toolcrib_common::{EventId, EventKind, ToolId};

/// A tool in the inventory.
///
/// Text columns are never NULL; an empty string means "not set". A tool is
/// available when `holder` is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub id: ToolId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub serial_no: String,
    /// Public URL path of the photo (`/uploads/...`), or empty.
    pub photo_path: String,
    pub holder: String,
    /// `YYYY-MM-DD`, empty while the tool is available.
    pub checkout_date: String,
    /// Public URL path of the QR code image, or empty.
    pub qr_path: String,
    pub created_at: DateTime<Utc>,
}

impl Tool {
    /// Whether the tool is currently checked out.
    pub fn is_checked_out(&self) -> bool {
        !self.holder.is_empty()
    }
}

/// An entry in a tool's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub tool_id: ToolId,
    pub kind: EventKind,
    pub person: String,
    pub occurred_at: DateTime<Utc>,
    pub note: String,
}
