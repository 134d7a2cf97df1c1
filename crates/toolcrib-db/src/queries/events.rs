//! Tool history queries.

use chrono::Utc;
use rusqlite::Connection;
use toolcrib_common::{Error, EventId, EventKind, Result, ToolId};

use super::timestamp_column;
use crate::models::Event;

fn parse_event_row(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    let kind: String = row.get(2)?;
    let kind = kind.parse::<EventKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Event {
        id: EventId::from(row.get::<_, i64>(0)?),
        tool_id: ToolId::from(row.get::<_, i64>(1)?),
        kind,
        person: row.get(3)?,
        occurred_at: timestamp_column(row, 4)?,
        note: row.get(5)?,
    })
}

/// Append an event to a tool's history, timestamped now.
pub fn insert_event(
    conn: &Connection,
    tool_id: ToolId,
    kind: EventKind,
    person: &str,
    note: &str,
) -> Result<Event> {
    let occurred_at = Utc::now();

    conn.execute(
        "INSERT INTO events (tool_id, kind, person, occurred_at, note)
         VALUES (:tool_id, :kind, :person, :occurred_at, :note)",
        rusqlite::named_params! {
            ":tool_id": tool_id.get(),
            ":kind": kind.to_string(),
            ":person": person,
            ":occurred_at": occurred_at.to_rfc3339(),
            ":note": note,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Event {
        id: EventId::from(conn.last_insert_rowid()),
        tool_id,
        kind,
        person: person.to_string(),
        occurred_at,
        note: note.to_string(),
    })
}

/// List a tool's history, newest first.
pub fn list_events_for_tool(conn: &Connection, tool_id: ToolId) -> Result<Vec<Event>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, tool_id, kind, person, occurred_at, note
             FROM events
             WHERE tool_id = :tool_id
             ORDER BY occurred_at DESC, id DESC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let events = stmt
        .query_map(
            rusqlite::named_params! { ":tool_id": tool_id.get() },
            parse_event_row,
        )
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(events)
}
