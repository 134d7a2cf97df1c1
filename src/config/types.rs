use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Password used when `ADMIN_PASSWORD` is not provided anywhere.
pub const FALLBACK_ADMIN_PASSWORD: &str = "admin";

/// Signing key used when `SECRET_KEY` is not provided anywhere.
pub const FALLBACK_SECRET_KEY: &str = "dev-secret-change-me";

/// Placeholder the launcher ships with; operators are expected to replace it.
pub const PLACEHOLDER_LAUNCH_PASSWORD: &str = "change-me";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub launcher: LauncherConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Absolute base URL used in QR codes and API links, e.g.
    /// `https://tools.example.com`. Derived from the request when unset.
    #[serde(default)]
    pub public_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Administrator password (`ADMIN_PASSWORD`)
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Key for signing session cookies (`SECRET_KEY`)
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Session timeout in hours (default: 24)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_hours: u64,
}

fn default_session_timeout() -> u64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password: None,
            secret_key: None,
            session_timeout_hours: default_session_timeout(),
        }
    }
}

impl AuthConfig {
    pub fn admin_password(&self) -> &str {
        self.admin_password
            .as_deref()
            .unwrap_or(FALLBACK_ADMIN_PASSWORD)
    }

    pub fn secret_key(&self) -> &str {
        self.secret_key.as_deref().unwrap_or(FALLBACK_SECRET_KEY)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the database and, unless overridden, uploads.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Upload directory override (`UPLOAD_DIR`).
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,

    /// Database file override (`DATABASE_PATH`).
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            upload_dir: None,
            database_path: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl StorageConfig {
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("uploads"))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("toolcrib.db"))
    }
}

/// Settings read by `toolcrib launch`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LauncherConfig {
    /// Value exported as `ADMIN_PASSWORD` to the launched server.
    #[serde(default = "default_launch_password")]
    pub admin_password: String,
}

fn default_launch_password() -> String {
    PLACEHOLDER_LAUNCH_PASSWORD.to_string()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            admin_password: default_launch_password(),
        }
    }
}
