//! Deployment contract for hosting platforms.
//!
//! A platform builds with [`BUILD_COMMAND`], starts with [`START_COMMAND`],
//! supplies the variables in [`CONTRACT_VARS`] and mounts persistent storage
//! at [`PERSISTENT_MOUNT`]. `toolcrib check-env` prints [`ContractReport`].

use std::fmt;

use crate::config::{Config, FALLBACK_ADMIN_PASSWORD, FALLBACK_SECRET_KEY};

pub const BUILD_COMMAND: &str = "cargo build --release";
pub const START_COMMAND: &str = "./target/release/toolcrib serve";
pub const PERSISTENT_MOUNT: &str = "/var/data";

/// One environment variable of the contract.
#[derive(Debug, Clone, Copy)]
pub struct ContractVar {
    pub name: &'static str,
    pub required: bool,
    pub purpose: &'static str,
}

pub const CONTRACT_VARS: &[ContractVar] = &[
    ContractVar {
        name: "ADMIN_PASSWORD",
        required: true,
        purpose: "administrator password for the web UI",
    },
    ContractVar {
        name: "SECRET_KEY",
        required: true,
        purpose: "key used to sign session cookies",
    },
    ContractVar {
        name: "UPLOAD_DIR",
        required: false,
        purpose: "upload directory, point it at the persistent disk",
    },
];

#[derive(Debug, Clone)]
pub struct VarStatus {
    pub var: ContractVar,
    pub present: bool,
}

/// Result of checking the current environment against the contract.
#[derive(Debug, Clone)]
pub struct ContractReport {
    pub vars: Vec<VarStatus>,
    pub warnings: Vec<String>,
}

impl ContractReport {
    /// Check which contract variables are set and what the resolved
    /// configuration falls back to.
    pub fn check<F>(lookup: F, config: &Config) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars: Vec<VarStatus> = CONTRACT_VARS
            .iter()
            .map(|var| VarStatus {
                var: *var,
                present: lookup(var.name).is_some_and(|v| !v.trim().is_empty()),
            })
            .collect();

        ContractReport {
            warnings: fallback_warnings(config),
            vars,
        }
    }

    /// Whether every required variable is set.
    pub fn is_complete(&self) -> bool {
        self.vars.iter().all(|s| s.present || !s.var.required)
    }
}

/// Warnings for configuration that only works because of a development
/// fallback.
pub fn fallback_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.auth.admin_password() == FALLBACK_ADMIN_PASSWORD {
        warnings.push(format!(
            "ADMIN_PASSWORD is not set; the login password is '{}'",
            FALLBACK_ADMIN_PASSWORD
        ));
    }
    if config.auth.secret_key() == FALLBACK_SECRET_KEY {
        warnings.push(
            "SECRET_KEY is not set; sessions are signed with a development key".to_string(),
        );
    }
    warnings
}

impl fmt::Display for ContractReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Build command: {}", BUILD_COMMAND)?;
        writeln!(f, "Start command: {}", START_COMMAND)?;
        writeln!(f, "Persistent disk: {}", PERSISTENT_MOUNT)?;
        writeln!(f)?;
        for status in &self.vars {
            let mark = if status.present { "✓" } else { "✗" };
            let kind = if status.var.required {
                "required"
            } else {
                "optional"
            };
            writeln!(
                f,
                "{} {} ({}) - {}",
                mark, status.var.name, kind, status.var.purpose
            )?;
        }
        for warning in &self.warnings {
            writeln!(f, "warning: {}", warning)?;
        }
        Ok(())
    }
}
