//! Local read-only HTTP endpoint
//!
//! Exposes the device cache as a single GET route returning a JSON array of
//! cache entries. Before the first successful poll cycle the endpoint
//! answers 503; non-GET methods get 405 from the method router. The
//! endpoint never reflects internal poll errors; it serves whatever the
//! cache currently holds.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;

use crate::cache::DeviceCache;
use crate::error::Result;

async fn handle_devices(State(cache): State<DeviceCache>) -> Response {
    if !cache.is_ready() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response();
    }
    Json(cache.entries().await).into_response()
}

/// Build the router over a cache handle.
pub fn build_router(cache: DeviceCache) -> Router {
    Router::new()
        .route("/", get(handle_devices))
        .with_state(cache)
}

/// Bind `listen` and serve the read endpoint until the process exits.
pub async fn run_server(cache: DeviceCache, listen: &str) -> Result<()> {
    let app = build_router(cache);
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("Read endpoint listening on {}", listen);
    axum::serve(listener, app).await?;
    Ok(())
}
