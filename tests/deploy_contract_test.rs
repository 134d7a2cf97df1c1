//! The deployment contract: `serve` must come up from environment variables
//! alone. These tests mutate the process environment and run serially.

use std::path::Path;

use serial_test::serial;
use toolcrib::config::{resolve_config, EnvOverrides, FALLBACK_ADMIN_PASSWORD};
use toolcrib::deploy::{ContractReport, CONTRACT_VARS, PERSISTENT_MOUNT};

const ALL_VARS: &[&str] = &[
    "ADMIN_PASSWORD",
    "SECRET_KEY",
    "UPLOAD_DIR",
    "DATA_DIR",
    "DATABASE_PATH",
    "HOST",
    "PORT",
    "PUBLIC_URL",
    "TOOLCRIB_CONFIG",
];

/// Sets the given variables, clears the rest, restores everything on drop.
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        let saved = ALL_VARS
            .iter()
            .map(|name| (*name, std::env::var(name).ok()))
            .collect();
        for name in ALL_VARS {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
    }
}

fn lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[test]
#[serial]
fn serve_config_from_contract_vars_only() {
    let upload_dir = format!("{}/uploads", PERSISTENT_MOUNT);
    let _env = EnvGuard::set(&[
        ("ADMIN_PASSWORD", "s3cret"),
        ("SECRET_KEY", "0123456789abcdef"),
        ("UPLOAD_DIR", &upload_dir),
    ]);

    let config = resolve_config(None, &EnvOverrides::gather()).unwrap();
    assert_eq!(config.auth.admin_password(), "s3cret");
    assert_eq!(config.auth.secret_key(), "0123456789abcdef");
    assert_eq!(config.storage.upload_dir(), Path::new("/var/data/uploads"));

    let report = ContractReport::check(lookup, &config);
    assert!(report.is_complete());
    assert!(report.warnings.is_empty());
    assert_eq!(report.vars.len(), CONTRACT_VARS.len());
}

#[test]
#[serial]
fn missing_vars_fall_back_with_warnings() {
    let _env = EnvGuard::set(&[]);

    let config = resolve_config(None, &EnvOverrides::gather()).unwrap();
    assert_eq!(config.auth.admin_password(), FALLBACK_ADMIN_PASSWORD);

    let report = ContractReport::check(lookup, &config);
    assert!(!report.is_complete());
    assert_eq!(report.warnings.len(), 2);
}

#[test]
#[serial]
fn optional_vars_override_listen_address() {
    let _env = EnvGuard::set(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "8123"),
        ("PUBLIC_URL", "https://tools.example.com/"),
        ("DATABASE_PATH", "/var/data/inventory.db"),
    ]);

    let config = resolve_config(None, &EnvOverrides::gather()).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8123);
    assert_eq!(
        config.server.public_url.as_deref(),
        Some("https://tools.example.com")
    );
    assert_eq!(
        config.storage.database_path(),
        Path::new("/var/data/inventory.db")
    );
}

#[test]
#[serial]
fn blank_values_count_as_unset() {
    let _env = EnvGuard::set(&[("ADMIN_PASSWORD", "  "), ("SECRET_KEY", "")]);

    let config = resolve_config(None, &EnvOverrides::gather()).unwrap();
    assert_eq!(config.auth.admin_password(), FALLBACK_ADMIN_PASSWORD);
    assert!(!ContractReport::check(lookup, &config).is_complete());
}
