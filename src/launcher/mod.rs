//! `toolcrib launch`: one-command local run.
//!
//! Steps, in order:
//! 1. create (or reuse) the isolated environment directory,
//! 2. load the launch manifest, failing before anything starts if it is
//!    missing or invalid,
//! 3. provision the database and upload directory (every run),
//! 4. export `ADMIN_PASSWORD`, `UPLOAD_DIR` and `DATABASE_PATH`,
//! 5. start `toolcrib serve` and wait for it,
//! 6. hold the terminal until Enter is pressed, unless disabled.
//!
//! The launcher exits with the server's exit code.

mod environment;
mod process;

pub use environment::{EnvStatus, Environment, Provisioned};
pub use process::{exit_code, pause, AppCommand, PAUSE_PROMPT};

use std::io::{BufRead, Write};
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{load_config, Config, PLACEHOLDER_LAUNCH_PASSWORD};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("cannot prepare environment directory {path:?}: {source}")]
    Environment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid launch manifest {path:?}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("provisioning failed: {0}")]
    Provision(String),

    #[error("failed to start the application: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub env_dir: PathBuf,
    pub manifest: PathBuf,
    pub pause: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            env_dir: PathBuf::from(".toolcrib"),
            manifest: PathBuf::from("toolcrib.toml"),
            pause: true,
        }
    }
}

/// What a completed launch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub env_status: EnvStatus,
    pub exit_code: i32,
    pub paused: bool,
}

/// Runs the launch sequence against the given terminal streams.
pub struct Launcher<R, W> {
    options: LaunchOptions,
    command: Option<AppCommand>,
    input: R,
    output: W,
}

impl Launcher<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn with_terminal(options: LaunchOptions) -> Self {
        Self::new(options, std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Launcher<R, W> {
    pub fn new(options: LaunchOptions, input: R, output: W) -> Self {
        Self {
            options,
            command: None,
            input,
            output,
        }
    }

    /// Replace the `serve` invocation with another command.
    pub fn command(mut self, command: AppCommand) -> Self {
        self.command = Some(command);
        self
    }

    /// Run the launch sequence.
    ///
    /// When pausing is enabled the terminal is held even if a step fails, so
    /// the error stays readable in a window opened just for the launch.
    pub fn run(mut self) -> Result<LaunchOutcome, LaunchError> {
        let result = self.launch();

        let paused = self.options.pause;
        if paused {
            if let Err(e) = &result {
                let _ = writeln!(self.output, "error: {}", e);
            }
            if let Err(e) = pause(&mut self.input, &mut self.output) {
                warn!("Could not wait for input: {}", e);
            }
            let _ = writeln!(self.output);
        }

        result.map(|(env_status, exit_code)| LaunchOutcome {
            env_status,
            exit_code,
            paused,
        })
    }

    fn launch(&mut self) -> Result<(EnvStatus, i32), LaunchError> {
        let env = Environment::new(&self.options.env_dir);
        let env_status = env.ensure()?;
        match env_status {
            EnvStatus::Created => info!("Created environment at {:?}", env.root()),
            EnvStatus::Reused => info!("Reusing environment at {:?}", env.root()),
        }

        let manifest = self.load_manifest()?;

        let provisioned = env.provision()?;
        info!(
            "Provisioned database {:?} (schema version {})",
            env.database_path(),
            provisioned.schema_version
        );

        if manifest.launcher.admin_password == PLACEHOLDER_LAUNCH_PASSWORD {
            warn!(
                "launcher.admin_password is still '{}'; set it in {:?}",
                PLACEHOLDER_LAUNCH_PASSWORD, self.options.manifest
            );
        }

        let mut command = match self.command.take() {
            Some(command) => command,
            None => {
                let mut command = AppCommand::current_exe_serve().map_err(LaunchError::Spawn)?;
                command
                    .arg("--config")
                    .arg(self.options.manifest.to_string_lossy());
                command
            }
        };
        command
            .env("ADMIN_PASSWORD", manifest.launcher.admin_password.as_str())
            .env("UPLOAD_DIR", env.upload_dir().to_string_lossy())
            .env("DATABASE_PATH", env.database_path().to_string_lossy());

        info!("Starting {:?}", command.program());
        let status = command.run().map_err(LaunchError::Spawn)?;
        let code = exit_code(status);
        if code == 0 {
            info!("Application exited normally");
        } else {
            warn!("Application exited with code {}", code);
        }

        Ok((env_status, code))
    }

    fn load_manifest(&self) -> Result<Config, LaunchError> {
        let path = &self.options.manifest;
        load_config(path).map_err(|e| LaunchError::Manifest {
            path: path.clone(),
            message: format!("{:#}", e),
        })
    }
}
