//! JSON API routes. All of them require a session cookie.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use toolcrib_common::{EventKind, ToolId};
use toolcrib_db::models::{Event, Tool};
use toolcrib_db::pool::get_conn;
use toolcrib_db::queries::{
    events,
    tools::{self, ToolFilter},
};

use super::error::AppError;
use super::{base_url, AppContext};

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/:tool_id", get(get_tool))
        .route("/tools/:tool_id/checkout", post(checkout_tool))
        .route("/tools/:tool_id/return", post(return_tool))
}

/// A tool as exposed by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: ToolId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub serial_no: String,
    pub photo_url: String,
    pub holder: String,
    pub checkout_date: String,
    pub qr_url: String,
    /// Absolute URL of the tool's page
    pub detail_url: String,
}

impl ToolResponse {
    fn new(tool: Tool, base_url: &str) -> Self {
        Self {
            detail_url: format!("{}/tool/{}", base_url, tool.id),
            id: tool.id,
            name: tool.name,
            description: tool.description,
            category: tool.category,
            serial_no: tool.serial_no,
            photo_url: tool.photo_path,
            holder: tool.holder,
            checkout_date: tool.checkout_date,
            qr_url: tool.qr_path,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub kind: EventKind,
    pub person: String,
    pub occurred_at: String,
    pub note: String,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            kind: event.kind,
            person: event.person,
            occurred_at: event.occurred_at.to_rfc3339(),
            note: event.note,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolDetailResponse {
    #[serde(flatten)]
    pub tool: ToolResponse,
    pub events: Vec<EventResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub person: String,
    #[serde(default)]
    pub date: Option<String>,
}

async fn list_tools(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Json<Vec<ToolResponse>>, AppError> {
    let base = base_url(&ctx.config, &headers);
    let conn = get_conn(&ctx.db_pool)?;
    let all = tools::list_tools(&conn, &ToolFilter::default())?;

    Ok(Json(
        all.into_iter()
            .map(|tool| ToolResponse::new(tool, &base))
            .collect(),
    ))
}

async fn get_tool(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(tool_id): Path<ToolId>,
) -> Result<Json<ToolDetailResponse>, AppError> {
    let conn = get_conn(&ctx.db_pool)?;
    let tool = tools::require_tool(&conn, tool_id)?;
    let history = events::list_events_for_tool(&conn, tool_id)?;

    Ok(Json(ToolDetailResponse {
        tool: ToolResponse::new(tool, &base_url(&ctx.config, &headers)),
        events: history.into_iter().map(Into::into).collect(),
    }))
}

async fn checkout_tool(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(tool_id): Path<ToolId>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<ToolResponse>, AppError> {
    let conn = get_conn(&ctx.db_pool)?;
    let tool = tools::checkout_tool(&conn, tool_id, &req.person, req.date.as_deref())?;

    tracing::info!("Tool {} checked out to {} via API", tool.id, tool.holder);
    Ok(Json(ToolResponse::new(tool, &base_url(&ctx.config, &headers))))
}

async fn return_tool(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(tool_id): Path<ToolId>,
) -> Result<Json<ToolResponse>, AppError> {
    let conn = get_conn(&ctx.db_pool)?;
    let tool = tools::return_tool(&conn, tool_id)?;

    tracing::info!("Tool {} returned via API", tool.id);
    Ok(Json(ToolResponse::new(tool, &base_url(&ctx.config, &headers))))
}
