//! Flagkeeper server entry point
//!
//! # Usage
//!
//! ```bash
//! # Serve the admin API
//! flagkeeper serve --config flagkeeper.toml --port 4242
//!
//! # Print a project's health report for a seed file
//! flagkeeper report --seed seed.yaml --project default
//! ```

use clap::{Parser, Subcommand};
use flagkeeper_api::{
    build_state, create_router, spawn_health_refresh, LogFormat, ServerConfig, SERVER_VERSION,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "flagkeeper")]
#[command(about = "Flagkeeper - feature toggle admin API with project health reports")]
#[command(version)]
struct Cli {
    /// Path to a TOML or YAML config file
    #[arg(short, long, global = true, env = "FLAGKEEPER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,

        /// Seed file with projects, feature types and toggles
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Log format (json or pretty)
        #[arg(long)]
        log_format: Option<LogFormat>,
    },

    /// Print the health report of one project in a seed file
    Report {
        /// Seed file with projects, feature types and toggles
        #[arg(short, long)]
        seed: PathBuf,

        /// Project id
        #[arg(short, long, default_value = "default")]
        project: String,
    },
}

fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    match cli.command {
        Commands::Serve {
            port,
            host,
            seed,
            log_format,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(seed) = seed {
                config.seed_file = Some(seed);
            }
            if let Some(format) = log_format {
                config.log_format = format;
            }
            config.validate()?;
            init_tracing(&config);

            let addr = config.socket_addr()?;
            let state = build_state(&config).await?;

            let refresh = config.health_refresh_interval().map(|interval| {
                spawn_health_refresh(state.health.clone(), state.metrics.clone(), interval)
            });

            tracing::info!(version = SERVER_VERSION, "Starting Flagkeeper on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, create_router(state.clone()))
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if let Some(handle) = refresh {
                handle.abort();
            }
            state.stores.destroy();
            tracing::info!("Flagkeeper stopped");
        }

        Commands::Report { seed, project } => {
            config.log_format = LogFormat::Pretty;
            config.log_level = "warn".to_string();
            config.seed_file = Some(seed);
            init_tracing(&config);

            let state = build_state(&config).await?;
            let report = state.health.project_health_report(&project).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
