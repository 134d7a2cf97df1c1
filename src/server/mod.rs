use crate::config::Config;
use crate::deploy::fallback_warnings;
use crate::uploads::{UploadStore, PUBLIC_PREFIX};
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use toolcrib_db::pool::{init_pool, DbPool};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod auth;
pub mod error;
pub mod forms;
pub mod routes_api;
pub mod routes_pages;
pub mod views;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub db_pool: DbPool,
    pub uploads: Arc<UploadStore>,
}

impl AppContext {
    pub fn new(config: Config, db_pool: DbPool, uploads: UploadStore) -> Self {
        Self {
            config: Arc::new(config),
            db_pool,
            uploads: Arc::new(uploads),
        }
    }
}

/// Base URL for absolute links: `public_url` if configured, otherwise the
/// request's `Host` header, otherwise the listen address.
pub fn base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(ref url) = config.server.public_url {
        return url.trim_end_matches('/').to_string();
    }

    match headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
    {
        Some(host) => format!("http://{}", host),
        None => format!("http://{}:{}", config.server.host, config.server.port),
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    // Browser pages redirect to /login without a session
    let pages = routes_pages::page_routes().route_layer(middleware::from_fn_with_state(
        ctx.clone(),
        auth::require_page_session,
    ));

    // The API answers 401 instead
    let api = routes_api::api_routes().route_layer(middleware::from_fn_with_state(
        ctx.clone(),
        auth::require_api_session,
    ));

    Router::new()
        .route("/health", get(health_check))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .merge(pages)
        .nest("/api", api)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(ctx.uploads.dir()))
        .layer(DefaultBodyLimit::max(ctx.config.storage.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Create the upload directory and open (and migrate) the database.
pub fn open_storage(config: &Config) -> Result<(DbPool, UploadStore)> {
    let uploads = UploadStore::new(config.storage.upload_dir());
    uploads
        .ensure_dir()
        .with_context(|| format!("Failed to create upload directory {:?}", uploads.dir()))?;

    let db_path = config.storage.database_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {:?}", parent))?;
    }
    let pool = init_pool(&db_path.to_string_lossy())
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

    tracing::info!("Database: {:?}", db_path);
    tracing::info!("Uploads: {:?}", uploads.dir());

    Ok((pool, uploads))
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    for warning in fallback_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let (db_pool, uploads) = open_storage(&config)?;
    let app = create_router(AppContext::new(config, db_pool, uploads));

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
