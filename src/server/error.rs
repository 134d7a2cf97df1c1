//! Error-to-HTTP response conversion.
//!
//! [`AppError`] renders a JSON body for the API, [`PageError`] renders an
//! HTML error page for the browser routes. Both wrap
//! [`toolcrib_common::Error`] so handlers can use `?` on query results.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;
use toolcrib_common::Error;

use super::views;

fn status_of(err: &Error) -> StatusCode {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(status = %status, error = %err, "Server error in handler");
    }
    status
}

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        let body = json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Same as [`AppError`], rendered as an HTML page.
#[derive(Debug)]
pub struct PageError(pub Error);

impl From<Error> for PageError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        // Internal details stay in the log.
        let message = if status.is_server_error() {
            "Something went wrong. Please try again.".to_string()
        } else {
            self.0.to_string()
        };

        (status, Html(views::error_page(status, &message))).into_response()
    }
}
