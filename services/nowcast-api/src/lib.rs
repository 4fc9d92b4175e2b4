//! Nowcast API service library.
//!
//! HTTP front end for the heavy-rain classifier: `POST /predict` returns the
//! probability, label and base64 PNGs; `POST /report` returns the same
//! prediction as a PDF attachment.

pub mod config;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router.
///
/// `/metrics` answers 503 unless a Prometheus handle is supplied.
pub fn build_router(state: Arc<AppState>, prometheus: Option<PrometheusHandle>, max_body_bytes: usize) -> Router {
    let mut app = Router::new()
        .route("/predict", post(handlers::predict::predict_handler))
        .route("/report", post(handlers::report::report_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler));

    if let Some(handle) = prometheus {
        app = app.layer(Extension(handle));
    }

    app.layer(Extension(state))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
