//! Sum Service: a health check and an integer summing endpoint.
//!
//! This is the application entry point. It initializes tracing, loads configuration
//! from an optional TOML file and the `PORT` environment variable, builds the Axum
//! router and serves it until shutdown.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sum_service::config::{AppConfig, DEFAULT_LOG_FILTER, PORT_ENV_VAR};
use sum_service::create_router;
use sum_service::http::start_server;

/// Sum Service: sums JSON arrays of integers over HTTP
#[derive(Parser, Debug)]
#[command(name = "sum-service", version, about)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "sum_service=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

/// Load the config file if one was given, then apply `PORT`.
fn load_config(args: &Args) -> Result<AppConfig, sum_service::config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let port = std::env::var(PORT_ENV_VAR).ok();
    config.apply_port_override(port.as_deref())?;

    Ok(config)
}

fn init_tracing(log_filter: &str, json: bool) {
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(log_filter));

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Config errors are reported after tracing is up, so load first and keep the result
    let config = load_config(&args);

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let json = config
        .as_ref()
        .map(|c| c.logging.is_json())
        .unwrap_or(false);
    init_tracing(&log_filter, json);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        host = %config.http.host,
        port = config.http.port,
        log_requests = config.logging.log_requests,
        "Loaded configuration"
    );

    let app = create_router(&config);

    match start_server(app, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
