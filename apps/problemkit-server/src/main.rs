mod config;
mod routes;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use problemkit::{ProblemMiddleware, init_logging};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Demo HTTP server answering failures with RFC 7807 problem responses
#[derive(Parser)]
#[command(name = "problemkit-server")]
#[command(about = "Demo HTTP server answering failures with RFC 7807 problem responses")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Send full error detail to clients, including for 500s
    #[arg(long)]
    verbose_errors: bool,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // defaults -> YAML -> env (PROBLEMKIT__*) -> CLI
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose_errors);

    if cli.print_config {
        println!("{}", config.to_pretty_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, cli.verbose).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &ServerConfig) -> Result<()> {
    // header names are only validated when the middleware is built
    ProblemMiddleware::from_config(&config.problems)?;
    println!("Configuration is valid");
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

async fn run_server(config: ServerConfig, verbosity: u8) -> Result<()> {
    init_logging(&config.logging, verbosity)?;

    let middleware = ProblemMiddleware::from_config(&config.problems)?;
    if middleware.translator().is_verbose() {
        tracing::warn!("verbose errors enabled: 500 responses will expose internal detail");
    }
    let app = middleware
        .install(routes::router())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "problemkit-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("problemkit-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
