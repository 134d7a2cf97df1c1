//! The isolated environment directory used by `toolcrib launch`.

use std::path::{Path, PathBuf};

use toolcrib_db::migrations;
use toolcrib_db::pool::{get_conn, init_pool};

use super::LaunchError;

/// Whether [`Environment::ensure`] had to create the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvStatus {
    Created,
    Reused,
}

/// Outcome of the provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provisioned {
    pub schema_version: usize,
}

/// Directory holding the database and uploads of a local run.
///
/// ```text
/// .toolcrib/
/// ├── toolcrib.db
/// └── uploads/
/// ```
#[derive(Debug, Clone)]
pub struct Environment {
    root: PathBuf,
}

impl Environment {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join("toolcrib.db")
    }

    /// Create the environment directory unless it already exists.
    ///
    /// An existing directory is left untouched.
    pub fn ensure(&self) -> Result<EnvStatus, LaunchError> {
        if self.root.is_dir() {
            return Ok(EnvStatus::Reused);
        }
        if self.root.exists() {
            return Err(LaunchError::Environment {
                path: self.root.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "path exists and is not a directory",
                ),
            });
        }

        std::fs::create_dir_all(self.upload_dir()).map_err(|source| LaunchError::Environment {
            path: self.root.clone(),
            source,
        })?;

        Ok(EnvStatus::Created)
    }

    /// Bring the environment up to date: upload directory present, database
    /// created and migrated. Safe to run on every launch.
    pub fn provision(&self) -> Result<Provisioned, LaunchError> {
        std::fs::create_dir_all(self.upload_dir()).map_err(|source| {
            LaunchError::Environment {
                path: self.upload_dir(),
                source,
            }
        })?;

        let db_path = self.database_path();
        let pool = init_pool(&db_path.to_string_lossy())
            .map_err(|e| LaunchError::Provision(e.to_string()))?;
        let conn = get_conn(&pool).map_err(|e| LaunchError::Provision(e.to_string()))?;
        let schema_version = migrations::current_version(&conn)
            .map_err(|e| LaunchError::Provision(e.to_string()))?;

        Ok(Provisioned { schema_version })
    }
}
