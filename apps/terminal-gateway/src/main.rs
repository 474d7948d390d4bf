//! Terminal Gateway Binary
//!
//! Starts the HTTP gateway in front of a single trading terminal.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin terminal-gateway
//! ```
//!
//! # Environment Variables
//!
//! - `GATEWAY_CONFIG`: path to the YAML config (default: `config.yaml`)
//! - `RUST_LOG`: log filter (default: `observability.logging.level`)
//! - `OTEL_ENABLED`: set to `false` to disable OTLP export

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use terminal_gateway::config::{Config, load_config};
use terminal_gateway::infrastructure::config::Container;
use terminal_gateway::infrastructure::http::create_router;
use terminal_gateway::infrastructure::terminal::PaperTerminal;
use terminal_gateway::observability::{MetricsConfig, init_metrics};
use terminal_gateway::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();

    let config = match load_config(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _telemetry = init_telemetry(&config.observability.logging);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting terminal gateway");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Terminal gateway stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Terminal gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let bind_ip = config.server.bind_address.parse::<std::net::IpAddr>()?;

    let metrics_addr = SocketAddr::new(bind_ip, config.server.metrics_port);
    if let Err(e) = init_metrics(&MetricsConfig::with_addr(metrics_addr)) {
        tracing::warn!(error = %e, "Metrics exporter not started");
    }

    // No native terminal bridge is linked into this build.
    let terminal = Arc::new(PaperTerminal::demo());
    tracing::warn!("Using the simulated paper terminal");

    let container = Container::new(terminal, config.clone());
    container.session_lifecycle_use_case().initialize().await?;
    tracing::info!("Terminal initialized");

    let app = create_router(container.app_state());
    let http_addr = SocketAddr::new(bind_ip, config.server.http_port);
    let listener = TcpListener::bind(http_addr).await?;
    tracing::info!(%http_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
