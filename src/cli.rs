use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "toolcrib")]
#[command(author, version, about = "Tool inventory with QR-coded tool cards")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (production start command)
    Serve {
        /// Host to bind to (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Prepare a local environment and run the server in it
    Launch {
        /// Environment directory
        #[arg(long, default_value = ".toolcrib")]
        env_dir: PathBuf,

        /// Launch manifest
        #[arg(long, default_value = "toolcrib.toml")]
        manifest: PathBuf,

        /// Exit right after the server stops instead of waiting for Enter
        #[arg(long)]
        no_pause: bool,
    },

    /// Create the upload directory and migrate the database
    Provision,

    /// Check the deployment environment variables
    CheckEnv {
        /// Exit with an error if a required variable is missing
        #[arg(long)]
        strict: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Generate a random value for SECRET_KEY
    GenerateSecret,

    /// Display version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_launch_defaults() {
        let cli = Cli::parse_from(["toolcrib", "launch"]);
        match cli.command {
            Commands::Launch {
                env_dir,
                manifest,
                no_pause,
            } => {
                assert_eq!(env_dir, PathBuf::from(".toolcrib"));
                assert_eq!(manifest, PathBuf::from("toolcrib.toml"));
                assert!(!no_pause);
            }
            _ => panic!("expected launch"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["toolcrib", "serve", "--config", "site.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                host: None,
                port: None
            }
        ));
    }
}
