mod cli;

use toolcrib::{
    config::{self, EnvOverrides},
    deploy::ContractReport,
    launcher::{LaunchOptions, Launcher},
    server::{self, auth},
};
use toolcrib_db::{migrations, pool::get_conn};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A .env file is optional
    dotenvy::dotenv().ok();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "toolcrib=trace,toolcrib_db=debug,tower_http=debug".to_string()
        } else {
            "toolcrib=debug,toolcrib_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => serve(cli.config.as_deref(), host, port),
        Commands::Launch {
            env_dir,
            manifest,
            no_pause,
        } => launch(LaunchOptions {
            env_dir,
            manifest,
            pause: !no_pause,
        }),
        Commands::Provision => provision(cli.config.as_deref()),
        Commands::CheckEnv { strict } => check_env(cli.config.as_deref(), strict),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::GenerateSecret => {
            println!("{}", auth::generate_secret());
            Ok(())
        }
        Commands::Version => {
            println!("toolcrib {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = config::resolve_config(config_path, &EnvOverrides::gather())?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting toolcrib {}", env!("CARGO_PKG_VERSION"));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(server::start_server(config))
}

fn launch(options: LaunchOptions) -> Result<()> {
    let outcome = Launcher::with_terminal(options).run()?;
    std::process::exit(outcome.exit_code);
}

fn provision(config_path: Option<&Path>) -> Result<()> {
    let config = config::resolve_config(config_path, &EnvOverrides::gather())?;
    let (pool, uploads) = server::open_storage(&config)?;
    let conn = get_conn(&pool)?;
    let version = migrations::current_version(&conn)?;

    println!("✓ Database ready: {:?}", config.storage.database_path());
    println!("  Schema version: {}", version);
    println!("✓ Upload directory ready: {:?}", uploads.dir());
    Ok(())
}

fn check_env(config_path: Option<&Path>, strict: bool) -> Result<()> {
    let config = config::resolve_config(config_path, &EnvOverrides::gather())?;
    let report = ContractReport::check(|name| std::env::var(name).ok(), &config);

    print!("{}", report);
    println!();
    if report.is_complete() {
        println!("All required variables are set.");
    } else {
        println!("Some required variables are missing; development fallbacks will be used.");
        if strict {
            anyhow::bail!("deployment environment is incomplete");
        }
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Data directory: {:?}", config.storage.data_dir);
            println!("  Upload directory: {:?}", config.storage.upload_dir());
            println!(
                "  Launcher password: {}",
                if config.launcher.admin_password == config::PLACEHOLDER_LAUNCH_PASSWORD {
                    "placeholder (change it)"
                } else {
                    "set"
                }
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
