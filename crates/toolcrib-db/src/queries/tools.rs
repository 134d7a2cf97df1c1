//! Tool database queries.
//!
//! CRUD for tools plus the two state transitions that matter: checkout
//! (hand a tool to a person) and return. Every transition writes its history
//! event in the same transaction as the tool update.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use toolcrib_common::{Error, EventKind, Result, ToolId};

use super::{events, timestamp_column};
use crate::models::Tool;

const TOOL_COLUMNS: &str = "id, name, description, category, serial_no, photo_path, holder, \
                            checkout_date, qr_path, created_at";

/// Fields for a new tool.
#[derive(Debug, Clone, Default)]
pub struct NewTool {
    pub name: String,
    pub description: String,
    pub category: String,
    pub serial_no: String,
    pub photo_path: String,
}

impl NewTool {
    /// A tool with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a tool card. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ToolUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub serial_no: Option<String>,
    pub photo_path: Option<String>,
}

/// Filter for [`list_tools`]. Empty strings are treated as "no filter".
#[derive(Debug, Clone, Default)]
pub struct ToolFilter {
    /// Case-insensitive substring match on name, description or serial number.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Exact holder.
    pub holder: Option<String>,
}

fn parse_tool_row(row: &rusqlite::Row) -> rusqlite::Result<Tool> {
    Ok(Tool {
        id: ToolId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        serial_no: row.get(4)?,
        photo_path: row.get(5)?,
        holder: row.get(6)?,
        checkout_date: row.get(7)?,
        qr_path: row.get(8)?,
        created_at: timestamp_column(row, 9)?,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Escape LIKE wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Insert a new tool.
///
/// The name is trimmed and must not be empty; the other text fields are
/// trimmed as well.
pub fn create_tool(conn: &Connection, new: &NewTool) -> Result<Tool> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::invalid_input("tool name is required"));
    }

    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO tools (name, description, category, serial_no, photo_path, created_at)
         VALUES (:name, :description, :category, :serial_no, :photo_path, :created_at)",
        rusqlite::named_params! {
            ":name": name,
            ":description": new.description.trim(),
            ":category": new.category.trim(),
            ":serial_no": new.serial_no.trim(),
            ":photo_path": &new.photo_path,
            ":created_at": created_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    let id = ToolId::from(conn.last_insert_rowid());
    require_tool(conn, id)
}

/// Get a tool by ID.
///
/// * `Ok(Some(Tool))` - The tool if found
/// * `Ok(None)` - If the tool does not exist
pub fn get_tool(conn: &Connection, id: ToolId) -> Result<Option<Tool>> {
    let result = conn.query_row(
        &format!("SELECT {TOOL_COLUMNS} FROM tools WHERE id = :id"),
        rusqlite::named_params! { ":id": id.get() },
        parse_tool_row,
    );

    match result {
        Ok(tool) => Ok(Some(tool)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a tool by ID, failing with `NotFound` if it does not exist.
pub fn require_tool(conn: &Connection, id: ToolId) -> Result<Tool> {
    get_tool(conn, id)?.ok_or_else(|| Error::not_found(format!("tool {id}")))
}

/// List tools matching the filter, newest first.
pub fn list_tools(conn: &Connection, filter: &ToolFilter) -> Result<Vec<Tool>> {
    let search_pattern = non_empty(&filter.search).map(like_pattern);
    let category = non_empty(&filter.category);
    let holder = non_empty(&filter.holder);

    let mut query = format!("SELECT {TOOL_COLUMNS} FROM tools WHERE 1=1");
    let mut params: Vec<(&str, &dyn rusqlite::ToSql)> = Vec::new();

    if let Some(ref pattern) = search_pattern {
        query.push_str(
            " AND (name LIKE :search ESCAPE '\\' OR description LIKE :search ESCAPE '\\' \
             OR serial_no LIKE :search ESCAPE '\\')",
        );
        params.push((":search", pattern));
    }

    if let Some(ref category) = category {
        query.push_str(" AND category = :category");
        params.push((":category", category));
    }

    if let Some(ref holder) = holder {
        query.push_str(" AND holder = :holder");
        params.push((":holder", holder));
    }

    query.push_str(" ORDER BY created_at DESC, id DESC");

    let mut stmt = conn
        .prepare(&query)
        .map_err(|e| Error::database(e.to_string()))?;

    let tools = stmt
        .query_map(&*params, parse_tool_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(tools)
}

fn distinct_column(conn: &Connection, column: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT DISTINCT {column} FROM tools WHERE {column} != '' ORDER BY {column}"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let values = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(values)
}

/// Distinct non-empty categories, sorted.
pub fn distinct_categories(conn: &Connection) -> Result<Vec<String>> {
    distinct_column(conn, "category")
}

/// Distinct non-empty holders, sorted.
pub fn distinct_holders(conn: &Connection) -> Result<Vec<String>> {
    distinct_column(conn, "holder")
}

/// Apply a partial update and record an edit event.
pub fn update_tool(conn: &Connection, id: ToolId, update: &ToolUpdate) -> Result<Tool> {
    let current = require_tool(conn, id)?;

    let name = match update.name.as_deref().map(str::trim) {
        Some("") => return Err(Error::invalid_input("tool name is required")),
        Some(name) => name.to_string(),
        None => current.name,
    };
    let pick = |new: &Option<String>, old: String| {
        new.as_deref()
            .map(|v| v.trim().to_string())
            .unwrap_or(old)
    };

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    tx.execute(
        "UPDATE tools SET name = :name, description = :description, category = :category,
                serial_no = :serial_no, photo_path = :photo_path
         WHERE id = :id",
        rusqlite::named_params! {
            ":id": id.get(),
            ":name": name,
            ":description": pick(&update.description, current.description),
            ":category": pick(&update.category, current.category),
            ":serial_no": pick(&update.serial_no, current.serial_no),
            ":photo_path": update.photo_path.clone().unwrap_or(current.photo_path),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    events::insert_event(&tx, id, EventKind::Edit, "", "Card edited")?;

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    require_tool(conn, id)
}

/// Store the public path of a tool's QR code.
pub fn set_qr_path(conn: &Connection, id: ToolId, qr_path: &str) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE tools SET qr_path = :qr_path WHERE id = :id",
            rusqlite::named_params! { ":id": id.get(), ":qr_path": qr_path },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if updated == 0 {
        return Err(Error::not_found(format!("tool {id}")));
    }
    Ok(())
}

/// Hand a tool out to `person`.
///
/// `date` must be `YYYY-MM-DD` when given; it defaults to today (UTC).
/// Fails with `Conflict` if the tool is already checked out.
pub fn checkout_tool(
    conn: &Connection,
    id: ToolId,
    person: &str,
    date: Option<&str>,
) -> Result<Tool> {
    let person = person.trim();
    if person.is_empty() {
        return Err(Error::invalid_input("person is required"));
    }

    let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| Error::invalid_input(format!("invalid date: {raw}")))?,
        None => Utc::now().date_naive(),
    };
    let date = date.format("%Y-%m-%d").to_string();

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let tool = require_tool(&tx, id)?;
    if tool.is_checked_out() {
        return Err(Error::conflict(format!(
            "tool {id} is already checked out to {}",
            tool.holder
        )));
    }

    tx.execute(
        "UPDATE tools SET holder = :holder, checkout_date = :date WHERE id = :id",
        rusqlite::named_params! { ":id": id.get(), ":holder": person, ":date": &date },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    events::insert_event(
        &tx,
        id,
        EventKind::Checkout,
        person,
        &format!("Checked out {date}"),
    )?;

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    require_tool(conn, id)
}

/// Take a tool back from its holder.
///
/// Fails with `Conflict` if the tool is not checked out.
pub fn return_tool(conn: &Connection, id: ToolId) -> Result<Tool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let tool = require_tool(&tx, id)?;
    if !tool.is_checked_out() {
        return Err(Error::conflict(format!("tool {id} is not checked out")));
    }

    tx.execute(
        "UPDATE tools SET holder = '', checkout_date = '' WHERE id = :id",
        rusqlite::named_params! { ":id": id.get() },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    events::insert_event(&tx, id, EventKind::Return, &tool.holder, "Returned")?;

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    require_tool(conn, id)
}
