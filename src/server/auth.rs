//! Authentication for the web UI and API, plus flash messages.
//!
//! There is a single administrator password. A successful login stores a
//! signed session in a cookie: `base64url(json).hex(hmac_sha256)`, keyed by
//! `SECRET_KEY`. Anything that fails verification or has expired is treated
//! as logged out.

use crate::server::error::AppError;
use crate::server::{views, AppContext};
use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use toolcrib_common::Error;

pub const SESSION_COOKIE_NAME: &str = "toolcrib_session";
pub const FLASH_COOKIE_NAME: &str = "toolcrib_flash";

type HmacSha256 = Hmac<Sha256>;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn sign(key: &[u8], payload: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

fn verify(key: &[u8], payload: &[u8], tag: &[u8]) -> bool {
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);
    mac.verify_slice(tag).is_ok()
}

/// Session data stored in the cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub expires_at: u64,
}

impl SessionData {
    pub fn new(timeout_hours: u64) -> Self {
        Self {
            expires_at: now_secs() + timeout_hours * 3600,
        }
    }

    pub fn is_valid(&self) -> bool {
        now_secs() < self.expires_at
    }

    pub fn encode(&self, secret: &str) -> Option<String> {
        let json = serde_json::to_vec(self).ok()?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let tag = sign(secret.as_bytes(), payload.as_bytes())?;
        Some(format!("{}.{}", payload, hex::encode(tag)))
    }

    /// Verify and decode a cookie value. Expiry is not checked here.
    pub fn decode(secret: &str, value: &str) -> Option<Self> {
        let (payload, tag) = value.rsplit_once('.')?;
        let tag = hex::decode(tag).ok()?;
        if !verify(secret.as_bytes(), payload.as_bytes(), &tag) {
            return None;
        }
        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Compare a submitted password with the configured one in constant time.
pub fn password_matches(expected: &str, given: &str) -> bool {
    const KEY: &[u8] = b"toolcrib-password-check";
    match sign(KEY, expected.as_bytes()) {
        Some(tag) => verify(KEY, given.as_bytes(), &tag),
        None => false,
    }
}

pub fn has_valid_session(ctx: &AppContext, jar: &CookieJar) -> bool {
    jar.get(SESSION_COOKIE_NAME)
        .and_then(|c| SessionData::decode(ctx.config.auth.secret_key(), c.value()))
        .is_some_and(|s| s.is_valid())
}

/// Only local absolute paths are accepted as a post-login target.
///
/// Control characters are refused: they are not valid in a `Location`
/// header, and browsers drop tabs and newlines, which would turn `/\t/host`
/// into `//host`.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n)
            if n.starts_with('/')
                && !n.starts_with("//")
                && !n.contains('\\')
                && !n.chars().any(char::is_control) =>
        {
            n
        }
        _ => "/",
    }
}

/// Middleware for the HTML pages: redirect to the login form.
pub async fn require_page_session(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    request: Request<Body>,
    next: Next,
) -> Response {
    if has_valid_session(&ctx, &jar) {
        return next.run(request).await;
    }

    let target = format!(
        "/login?next={}",
        urlencoding::encode(request.uri().path())
    );
    Redirect::to(&target).into_response()
}

/// Middleware for the JSON API: answer 401.
pub async fn require_api_session(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !has_valid_session(&ctx, &jar) {
        return Err(Error::Unauthorized.into());
    }
    Ok(next.run(request).await)
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// Login form
pub async fn login_page(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
) -> Response {
    if has_valid_session(&ctx, &jar) {
        return Redirect::to(safe_next(query.next.as_deref())).into_response();
    }
    Html(views::login_page(None)).into_response()
}

/// Login handler
pub async fn login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = &ctx.config.auth;

    if !password_matches(auth.admin_password(), &form.password) {
        tracing::warn!("Rejected login attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Html(views::login_page(Some("Invalid password."))),
        )
            .into_response();
    }

    let Some(value) = SessionData::new(auth.session_timeout_hours).encode(auth.secret_key())
    else {
        return AppError::from(Error::internal("failed to sign session")).into_response();
    };

    let cookie = Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(auth.session_timeout_hours as i64))
        .build();

    tracing::info!("Administrator logged in");
    (
        jar.add(cookie),
        Redirect::to(safe_next(query.next.as_deref())),
    )
        .into_response()
}

/// Logout handler
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build();
    (jar.remove(cookie), Redirect::to("/login"))
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    /// Bootstrap alert level (`success`, `warning`, `danger`)
    pub level: String,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            message: message.into(),
        }
    }
}

pub fn set_flash(jar: CookieJar, flash: &Flash) -> CookieJar {
    let Ok(json) = serde_json::to_vec(flash) else {
        return jar;
    };
    let cookie = Cookie::build((FLASH_COOKIE_NAME, URL_SAFE_NO_PAD.encode(json)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Read and clear the pending flash message.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE_NAME) else {
        return (jar, None);
    };
    let flash = URL_SAFE_NO_PAD
        .decode(cookie.value())
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok());

    let removal = Cookie::build((FLASH_COOKIE_NAME, "")).path("/").build();
    (jar.remove(removal), flash)
}

/// Generate a random value for `SECRET_KEY`
pub fn generate_secret() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
