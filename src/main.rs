// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timetracker API Server
//!
//! Serves the time tracking API behind GitHub OAuth sessions.

use std::sync::Arc;
use timetracker::{config::Config, db::MemoryDb, services::GitHubClient, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        hosting_env = ?config.hosting_env,
        secure_cookies = config.hosting_env.secure_cookies(),
        "Starting Timetracker API"
    );

    if config.session_cache_ttl.is_zero() {
        tracing::info!("Session cache disabled, every request is checked with GitHub");
    } else {
        tracing::info!(
            ttl_secs = config.session_cache_ttl.as_secs(),
            "Session cache enabled"
        );
    }

    let github = GitHubClient::new(&config)?;
    let store = Arc::new(MemoryDb::new());

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(github.clone()),
        github,
        store,
    ));

    // Build router
    let app = timetracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("timetracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
