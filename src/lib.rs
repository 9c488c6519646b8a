pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        // Init writes the config file, so it must not depend on loading one.
        Commands::Init => cli::cmd_init(),
        Commands::Serve => {
            let (config, prometheus_handle) = prepare_runtime()?;
            run_server(config, prometheus_handle).await
        }
        Commands::Migrate => {
            let (config, _) = prepare_runtime()?;
            cli::cmd_migrate(&config).await
        }
        Commands::CreateUser {
            email,
            password,
            name,
            role,
        } => {
            let (config, _) = prepare_runtime()?;
            cli::cmd_create_user(&config, &email, &password, name.as_deref(), &role).await
        }
        Commands::ListUsers => {
            let (config, _) = prepare_runtime()?;
            cli::cmd_list_users(&config).await
        }
    }
}

/// Loads the config, installs the metrics recorder and starts logging.
fn prepare_runtime() -> anyhow::Result<(
    Config,
    Option<metrics_exporter_prometheus::PrometheusHandle>,
)> {
    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    Ok((config, prometheus_handle))
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "qrlink")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("qrlink v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;

    let shared = Arc::new(SharedState::new(config).await.inspect_err(|e| {
        error!("Database initialization failed: {e:#}");
    })?);

    shared.bootstrap().await.inspect_err(|e| {
        error!("{e:#}");
    })?;

    let api_state = api::create_app_state(shared, prometheus_handle);
    let app = api::router(api_state).await?;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web server running at http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
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
