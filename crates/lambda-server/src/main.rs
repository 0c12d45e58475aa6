//! `lambda-server` standalone binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise telemetry (structured logs, optional OTLP export).
//! 3. Register the built-in functions.
//! 4. Start the invocation server (the process exits if the port is taken).
//! 5. On Ctrl-C, stop with the configured grace period.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use lambda_server::config::Config;
use lambda_server::{functions, telemetry, InvocationFacade};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        lambda_port = cfg.lambda_port,
        "lambda-server starting"
    );

    // -----------------------------------------------------------------------
    // 3. Functions
    // -----------------------------------------------------------------------
    let registry = Arc::new(functions::builtin_table());

    // -----------------------------------------------------------------------
    // 4. Invocation server
    // -----------------------------------------------------------------------
    let mut facade = InvocationFacade::new(cfg.server_options(), registry)
        .context("failed to construct invocation server")?;
    facade.start().await?;

    // -----------------------------------------------------------------------
    // 5. Shutdown
    // -----------------------------------------------------------------------
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!(grace_ms = cfg.stop_timeout_ms, "shutdown requested");
    facade.stop(Some(cfg.stop_timeout())).await?;

    telemetry::shutdown_telemetry();
    Ok(())
}
