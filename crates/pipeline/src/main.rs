//! intake-linkage: attach salted patient linkage identifiers to bundle files.

use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkage_pipeline::{AppError, RunReport, config::Config};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    match run_pipeline().await {
        Ok(report) if report.has_failures() => {
            tracing::warn!("Run finished with rejected or partially linked bundles");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Linkage run aborted");
            ExitCode::FAILURE
        }
    }
}

/// Load configuration and run until done or interrupted
async fn run_pipeline() -> Result<RunReport, AppError> {
    let config = Config::from_env()?;
    tracing::info!(config = ?config, "Configuration loaded");

    tokio::select! {
        result = linkage_pipeline::run(&config) => result,
        _ = shutdown_signal() => Err(AppError::Interrupted),
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, abandoning in-flight bundles");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, abandoning in-flight bundles");
        }
    }
}
