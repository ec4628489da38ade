//! HTTP adapter - upload endpoint for the analytics report
//!
//! `POST /customer-analytics` takes a multipart form with a `file` field
//! holding CSV text and always answers with a JSON body: either the report
//! or `{"error": ...}`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::domain::result::Error;
use crate::domain::AnalyticsOutcome;
use crate::services::AnalyticsService;

pub const ANALYTICS_ROUTE: &str = "/customer-analytics";

/// Name of the multipart field carrying the CSV file
pub const UPLOAD_FIELD: &str = "file";

/// Uploads above this size are rejected before decoding
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    service: Arc<AnalyticsService>,
}

/// Build the router; any origin may call it
pub fn router(service: AnalyticsService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(ANALYTICS_ROUTE, post(customer_analytics))
        .with_state(AppState { service: Arc::new(service) })
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve on an already bound listener until ctrl-c
pub async fn serve(listener: TcpListener, service: AnalyticsService) -> Result<()> {
    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!(%addr, route = ANALYTICS_ROUTE, "Analytics server listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Analytics server error")
}

/// Bind `addr` and serve
pub async fn bind_and_serve(addr: &str, service: AnalyticsService) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve(listener, service).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down analytics server");
}

async fn customer_analytics(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<AnalyticsOutcome>) {
    let bytes = match read_upload(multipart).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let outcome = state.service.reject(e, ANALYTICS_ROUTE);
            return (StatusCode::OK, Json(outcome));
        }
    };

    // CPU-bound fit stays off the reactor
    let service = Arc::clone(&state.service);
    match tokio::task::spawn_blocking(move || service.run_csv(&bytes, ANALYTICS_ROUTE)).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)),
        Err(e) => {
            warn!(error = %e, "Analytics task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AnalyticsOutcome::failed("Internal error while computing analytics")),
            )
        }
    }
}

/// Pull the bytes of the `file` field out of the form
async fn read_upload(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Vec<u8>, Error> {
    let mut multipart = multipart.map_err(|e| Error::upload(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::upload(e.body_text()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field.bytes().await.map_err(|e| Error::upload(e.body_text()))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(Error::upload(format!("missing form field '{}'", UPLOAD_FIELD)))
}
