//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary upload
//! directory and a full [`AppContext`], plus helpers for building requests.
//!
//! The in-memory pool holds a single connection: never keep a connection from
//! [`TestHarness::conn`] alive while sending a request.
#![allow(dead_code)]

use std::io::Cursor;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use toolcrib::config::Config;
use toolcrib::server::auth::{SessionData, SESSION_COOKIE_NAME};
use toolcrib::server::{create_router, AppContext};
use toolcrib::uploads::UploadStore;
use toolcrib_db::models::Tool;
use toolcrib_db::pool::{get_conn, init_memory_pool, DbPool, PooledConnection};
use toolcrib_db::queries::tools::{self, NewTool};

pub const ADMIN_PASSWORD: &str = "hunter2";
pub const SECRET_KEY: &str = "test-secret-key";
const BOUNDARY: &str = "toolcrib-test-boundary";

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.admin_password = Some(ADMIN_PASSWORD.to_string());
    config.auth.secret_key = Some(SECRET_KEY.to_string());
    config
}

pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub upload_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let upload_dir = tempfile::tempdir().expect("failed to create upload dir");
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let uploads = UploadStore::new(upload_dir.path().to_path_buf());

        Self {
            ctx: AppContext::new(config, db.clone(), uploads),
            db,
            upload_dir,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn create_tool(&self, new: NewTool) -> Tool {
        tools::create_tool(&self.conn(), &new).expect("failed to create tool")
    }

    pub fn tool(&self, id: i64) -> Tool {
        tools::require_tool(&self.conn(), id.into()).expect("tool not found")
    }

    /// `Cookie` header value carrying a valid session.
    pub fn session_cookie(&self) -> String {
        let value = SessionData::new(1)
            .encode(SECRET_KEY)
            .expect("failed to sign session");
        format!("{}={}", SESSION_COOKIE_NAME, value)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    /// GET with a valid session.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, self.session_cookie())
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// POST an urlencoded form with a valid session.
    pub async fn post_form(&self, uri: &str, form: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::COOKIE, self.session_cookie())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    /// POST a multipart form with a valid session.
    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::HOST, "shed.local:5000")
                .header(header::COOKIE, self.session_cookie())
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(fields, file)))
                .unwrap(),
        )
        .await
    }

    /// POST a JSON body with a valid session.
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::HOST, "shed.local:5000")
                .header(header::COOKIE, self.session_cookie())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

/// Build a multipart body; `file` is sent as the `photo` field.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 120, 0]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// `name=value` pairs of every `Set-Cookie` header.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::to_string)
        .collect()
}
