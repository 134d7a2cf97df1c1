//! Browser pages: tool list, tool cards, checkout and return.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use toolcrib_common::{Error, ToolId};
use toolcrib_db::pool::get_conn;
use toolcrib_db::queries::{
    events,
    tools::{self, NewTool, ToolFilter, ToolUpdate},
};

use super::auth::{set_flash, take_flash, Flash};
use super::error::PageError;
use super::forms::ToolForm;
use super::views::{self, ListFilter};
use super::{base_url, AppContext};

/// Create page routes.
pub fn page_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(index))
        .route("/tool/new", get(new_tool_form).post(create_tool))
        .route("/tool/:tool_id", get(tool_detail))
        .route("/tool/:tool_id/edit", get(edit_tool_form).post(update_tool))
        .route("/tool/:tool_id/checkout", post(checkout_tool))
        .route("/tool/:tool_id/return", post(return_tool))
}

const PHOTO_SKIPPED: &str =
    "Saved without the photo: only png, jpg, jpeg, gif and webp files are accepted.";

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub cat: String,
    #[serde(default)]
    pub holder: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub date: String,
}

fn redirect_to_tool(jar: CookieJar, id: ToolId, flash: Flash) -> Response {
    (
        set_flash(jar, &flash),
        Redirect::to(&format!("/tool/{}", id)),
    )
        .into_response()
}

/// Remove a photo stored for a request whose database write failed.
fn discard_photo(ctx: &AppContext, public_path: Option<&str>) {
    if let Some(path) = public_path {
        if let Err(e) = ctx.uploads.remove(path) {
            tracing::warn!("Failed to remove orphaned upload {}: {}", path, e);
        }
    }
}

async fn index(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Query(query): Query<IndexQuery>,
) -> Result<(CookieJar, Html<String>), PageError> {
    let (jar, flash) = take_flash(jar);
    let list_filter = ListFilter {
        q: query.q.trim(),
        cat: query.cat.trim(),
        holder: query.holder.trim(),
    };

    let conn = get_conn(&ctx.db_pool)?;
    let filter = ToolFilter {
        search: Some(list_filter.q.to_string()),
        category: Some(list_filter.cat.to_string()),
        holder: Some(list_filter.holder.to_string()),
    };
    let found = tools::list_tools(&conn, &filter)?;
    let categories = tools::distinct_categories(&conn)?;
    let holders = tools::distinct_holders(&conn)?;

    let html = views::index_page(&found, &categories, &holders, &list_filter, flash.as_ref());
    Ok((jar, Html(html)))
}

async fn new_tool_form() -> Html<String> {
    Html(views::new_tool_page())
}

async fn create_tool(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let form = ToolForm::from_multipart(multipart).await?;

    let name = form.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(Error::invalid_input("Name is required").into());
    }

    let conn = get_conn(&ctx.db_pool)?;
    let stored_photo = match &form.photo {
        Some(photo) => ctx
            .uploads
            .store_photo(&photo.filename, &photo.data, Utc::now())?,
        None => None,
    };
    let photo_skipped = form.photo.is_some() && stored_photo.is_none();

    let created = tools::create_tool(
        &conn,
        &NewTool {
            name,
            description: form.description.unwrap_or_default(),
            category: form.category.unwrap_or_default(),
            serial_no: form.serial_no.unwrap_or_default(),
            photo_path: stored_photo.clone().unwrap_or_default(),
        },
    );
    let tool = match created {
        Ok(tool) => tool,
        Err(e) => {
            discard_photo(&ctx, stored_photo.as_deref());
            return Err(e.into());
        }
    };

    // The row is committed; a missing QR code must not fail the request.
    let detail_url = format!("{}/tool/{}", base_url(&ctx.config, &headers), tool.id);
    if let Err(e) = ctx
        .uploads
        .store_qr(tool.id, &detail_url)
        .and_then(|qr_path| tools::set_qr_path(&conn, tool.id, &qr_path))
    {
        tracing::warn!("No QR code for tool {}: {}", tool.id, e);
    }

    tracing::info!("Created tool {} ({})", tool.id, tool.name);
    let flash = if photo_skipped {
        Flash::warning(PHOTO_SKIPPED)
    } else {
        Flash::success("Tool added.")
    };
    Ok(redirect_to_tool(jar, tool.id, flash))
}

async fn tool_detail(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(tool_id): Path<ToolId>,
) -> Result<(CookieJar, Html<String>), PageError> {
    let (jar, flash) = take_flash(jar);

    let conn = get_conn(&ctx.db_pool)?;
    let tool = tools::require_tool(&conn, tool_id)?;
    let history = events::list_events_for_tool(&conn, tool_id)?;
    let today = Utc::now().format("%Y-%m-%d").to_string();

    let html = views::tool_detail_page(&tool, &history, &today, flash.as_ref());
    Ok((jar, Html(html)))
}

async fn edit_tool_form(
    State(ctx): State<AppContext>,
    Path(tool_id): Path<ToolId>,
) -> Result<Html<String>, PageError> {
    let conn = get_conn(&ctx.db_pool)?;
    let tool = tools::require_tool(&conn, tool_id)?;
    Ok(Html(views::edit_tool_page(&tool)))
}

async fn update_tool(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(tool_id): Path<ToolId>,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let form = ToolForm::from_multipart(multipart).await?;

    let conn = get_conn(&ctx.db_pool)?;
    tools::require_tool(&conn, tool_id)?;

    let photo_path = match &form.photo {
        Some(photo) => ctx
            .uploads
            .store_photo(&photo.filename, &photo.data, Utc::now())?,
        None => None,
    };

    let photo_skipped = form.photo.is_some() && photo_path.is_none();
    let update = ToolUpdate {
        name: form.name,
        description: form.description,
        category: form.category,
        serial_no: form.serial_no,
        photo_path,
    };
    if let Err(e) = tools::update_tool(&conn, tool_id, &update) {
        discard_photo(&ctx, update.photo_path.as_deref());
        return Err(e.into());
    }

    tracing::info!("Updated tool {}", tool_id);
    let flash = if photo_skipped {
        Flash::warning(PHOTO_SKIPPED)
    } else {
        Flash::success("Changes saved.")
    };
    Ok(redirect_to_tool(jar, tool_id, flash))
}

async fn checkout_tool(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(tool_id): Path<ToolId>,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, PageError> {
    let conn = get_conn(&ctx.db_pool)?;
    let tool = tools::checkout_tool(&conn, tool_id, &form.person, Some(&form.date))?;

    tracing::info!("Tool {} checked out to {}", tool.id, tool.holder);
    Ok(redirect_to_tool(jar, tool_id, Flash::success("Tool checked out.")))
}

async fn return_tool(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Path(tool_id): Path<ToolId>,
) -> Result<Response, PageError> {
    let conn = get_conn(&ctx.db_pool)?;
    tools::return_tool(&conn, tool_id)?;

    tracing::info!("Tool {} returned", tool_id);
    Ok(redirect_to_tool(jar, tool_id, Flash::success("Return accepted.")))
}
