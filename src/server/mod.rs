//! JSON API over the tracker, used by the web front end. Mutations are form encoded and accept an
//! optional `date` field, today is used when it's missing.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod shutdown;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use shutdown::detect_shutdown;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{tracker::AppTracker, utils::clock::Clock};

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<AppTracker>,
    pub clock: Arc<dyn Clock>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/today", get(handlers::today))
        .route("/api/day", get(handlers::day))
        .route("/api/search_food", get(handlers::search_food))
        .route("/api/update_task", post(handlers::update_task))
        .route("/api/update_goal", post(handlers::update_goal))
        .route("/api/check", post(handlers::check))
        .route("/api/check_goal", post(handlers::check_goal))
        .route("/api/add_goal", post(handlers::add_goal))
        .route("/api/add_food", post(handlers::add_food))
        .route("/api/add_water", post(handlers::add_water))
        .route("/api/plan", post(handlers::plan))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until Ctrl-C.
pub async fn serve(
    tracker: Arc<AppTracker>,
    clock: Arc<dyn Clock>,
    host: &str,
    port: u16,
) -> Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    let address = listener.local_addr()?;
    info!("Listening on {address}");
    println!("Serving on http://{address}");

    let cancellation = CancellationToken::new();
    tokio::spawn(detect_shutdown(cancellation.clone()));

    axum::serve(listener, router(AppState { tracker, clock }))
        .with_graceful_shutdown(cancellation.cancelled_owned())
        .await?;
    info!("Server stopped");
    Ok(())
}
