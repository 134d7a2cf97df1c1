//! Environment-variable layer of the configuration.
//!
//! These variables form the deployment contract: a host only has to provide
//! `ADMIN_PASSWORD`, `SECRET_KEY` and optionally `UPLOAD_DIR`.

use std::path::PathBuf;

use super::Config;

/// Values read from the process environment. `None` leaves the file/default
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub admin_password: Option<String>,
    pub secret_key: Option<String>,
    pub upload_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub public_url: Option<String>,
}

impl EnvOverrides {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            admin_password: var("ADMIN_PASSWORD"),
            secret_key: var("SECRET_KEY"),
            upload_dir: var("UPLOAD_DIR").map(PathBuf::from),
            data_dir: var("DATA_DIR").map(PathBuf::from),
            database_path: var("DATABASE_PATH").map(PathBuf::from),
            host: var("HOST"),
            port: var("PORT").and_then(|s| s.trim().parse().ok()),
            public_url: var("PUBLIC_URL").map(|s| s.trim_end_matches('/').to_string()),
        }
    }

    pub fn apply(&self, config: &mut Config) {
        if let Some(ref v) = self.admin_password {
            config.auth.admin_password = Some(v.clone());
        }
        if let Some(ref v) = self.secret_key {
            config.auth.secret_key = Some(v.clone());
        }
        if let Some(ref v) = self.data_dir {
            config.storage.data_dir = v.clone();
        }
        if let Some(ref v) = self.upload_dir {
            config.storage.upload_dir = Some(v.clone());
        }
        if let Some(ref v) = self.database_path {
            config.storage.database_path = Some(v.clone());
        }
        if let Some(ref v) = self.host {
            config.server.host = v.clone();
        }
        if let Some(v) = self.port {
            config.server.port = v;
        }
        if let Some(ref v) = self.public_url {
            config.server.public_url = Some(v.clone());
        }
    }
}
