// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo Portfolio API Server
//!
//! Stores users' portfolio collections and uploaded images, and serves
//! share-link previews.

use photo_portfolio::{config::Config, db::Database, services::BlobStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        "Starting Photo Portfolio API"
    );

    let db = Database::connect(&config).await?;
    let blobs = BlobStore::new(&config.upload_dir, &config.public_base_url).await?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        blobs,
    });

    // Build router
    let app = photo_portfolio::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("photo_portfolio=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
