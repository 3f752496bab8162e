// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Ingress Guard Service
//!
//! Rate limits and sanitizes inbound API requests before they reach
//! business logic.
//!
//! ## Usage
//!
//! The service provides two modes of operation:
//!
//! 1. **External auth service**: a fronting proxy calls `/check` to
//!    evaluate requests before forwarding.
//!
//! 2. **Direct mode**: requests are sent through `/submit`, which applies
//!    the guard in-path.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `DEFAULT_POLICY`: Policy for the direct-mode endpoint (default: standard)
//! - `SWEEP_INTERVAL_SECS`: Seconds between store sweeps (default: 300)
//! - `METRICS_ENABLED`: Expose /metrics (default: true)

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ingress_guard::{
    config::Config,
    handlers::{check, health, metrics_endpoint, submit, AppState},
    limiter::{spawn_sweeper, RateLimiter},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        default_policy = %config.guard.default_policy,
        sweep_interval_secs = config.guard.sweep_interval_secs,
        metrics_enabled = config.metrics.enabled,
        "Starting ingress guard"
    );

    // Create application state
    let limiter = Arc::new(RateLimiter::new());
    let state = Arc::new(AppState { limiter: limiter.clone(), config: config.clone() });

    // The sweeper is owned here: started on boot, aborted on shutdown.
    let sweeper = spawn_sweeper(limiter, config.guard.sweep_interval());

    // Build router
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/check", post(check))
        .route("/submit", post(submit));

    if config.metrics.enabled {
        app = app.route(config.metrics.path.as_str(), get(metrics_endpoint));
    }

    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install shutdown handler");
    }
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    let mut config = Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        ..Default::default()
    };
    if let Ok(policy) = std::env::var("DEFAULT_POLICY") {
        config.guard.default_policy = policy;
    }
    if let Some(interval) = std::env::var("SWEEP_INTERVAL_SECS").ok().and_then(|v| v.parse().ok())
    {
        config.guard.sweep_interval_secs = interval;
    }
    if let Some(enabled) = std::env::var("METRICS_ENABLED").ok().and_then(|v| v.parse().ok()) {
        config.metrics.enabled = enabled;
    }
    config
}
