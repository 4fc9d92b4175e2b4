//! Prometheus metrics recorded by the request handlers.

use std::time::Duration;

use metrics::{counter, histogram};

/// Result of one request, used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::ClientError => "client_error",
            Outcome::ServerError => "server_error",
        }
    }

    pub fn from_status(status: axum::http::StatusCode) -> Self {
        if status.is_server_error() {
            Outcome::ServerError
        } else if status.is_client_error() {
            Outcome::ClientError
        } else {
            Outcome::Success
        }
    }
}

pub fn record_prediction(outcome: Outcome) {
    counter!("nowcast_predictions_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_report(outcome: Outcome) {
    counter!("nowcast_reports_total", "outcome" => outcome.as_str()).increment(1);
}

/// Forward + backward pass time.
pub fn record_inference(elapsed: Duration) {
    histogram!("nowcast_inference_seconds").record(elapsed.as_secs_f64());
}
