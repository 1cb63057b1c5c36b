pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod parser;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::CommandFactory;
use cli::{Cli, Commands};
pub use config::Config;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Runs one parsed command line against an already loaded `config`.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    init_tracing(&config.general.log_level);

    let config_path = cli.config_path();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Init => cli::cmd_init(&config_path),

        Commands::Normalize { id } => cli::cmd_normalize(&config_path, &id),

        Commands::Serve { port } => run_server(config, config_path, port).await,

        command => {
            let state = SharedState::new(config, config_path).await?;
            run_catalog_command(&state, command).await
        }
    }
}

async fn run_catalog_command(state: &SharedState, command: Commands) -> anyhow::Result<()> {
    if !state.catalog.remote_available().await {
        let api_url = state.config.read().await.api_base().to_string();
        info!(api_url, "Catalog API unreachable, answering from cache only");
    }

    let result = match command {
        Commands::Star { id } => cli::cmd_star(state, &id).await,
        Commands::Movie { id } => cli::cmd_movie(state, &id).await,
        Commands::Search { keyword, max_pages } => {
            cli::cmd_search(state, &keyword.join(" "), max_pages).await
        }
        Commands::StarMovies { id, max_pages } => {
            cli::cmd_star_movies(state, &id, max_pages).await
        }
        Commands::Clean => cli::cmd_clean(state).await,
        Commands::History { limit } => cli::cmd_history(state, limit).await,
        Commands::Serve { .. } | Commands::Init | Commands::Normalize { .. } => Ok(()),
    };

    if let Err(e) = result {
        error!("Command failed: {e:#}");
    }

    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}

async fn run_server(
    mut config: Config,
    config_path: std::path::PathBuf,
    port: Option<u16>,
) -> anyhow::Result<()> {
    info!("javshelf v{} starting web API...", env!("CARGO_PKG_VERSION"));

    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    let prometheus_handle = {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    };

    let port = config.server.port;
    let shared = Arc::new(SharedState::new(config, config_path).await?);

    if let Some(report) = shared.catalog.purge().await {
        info!(
            actors = report.actors,
            movies = report.movies,
            associations = report.associations,
            "Startup purge finished"
        );
    }

    let app = api::router(api::create_app_state(shared, prometheus_handle)).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web API running at http://{addr}/api");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
