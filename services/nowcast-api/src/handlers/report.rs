//! POST /report

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Extension,
    },
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument};

use nowcast_common::NowcastError;
use report::{build_prediction_report_pdf, ReportRequest};

use crate::error::{ApiError, REPORT_FAILED};
use crate::inference::run_inference;
use crate::metrics::{record_report, Outcome};
use crate::state::AppState;

/// PDF bytes plus the attachment filename.
struct RenderedReport {
    filename: String,
    pdf: Vec<u8>,
}

#[instrument(skip_all)]
pub async fn report_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let result = report(state, multipart).await;
    record_report(match &result {
        Ok(_) => Outcome::Success,
        Err(e) => Outcome::from_status(e.status()),
    });
    let rendered = result?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", rendered.filename),
            ),
        ],
        rendered.pdf,
    )
        .into_response())
}

async fn report(
    state: Arc<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<RenderedReport, ApiError> {
    let input = super::read_patch(&state, multipart, REPORT_FAILED).await?;

    tokio::task::spawn_blocking(move || -> Result<RenderedReport, NowcastError> {
        let inference = run_inference(&state.classifier, &input)?;
        let request = ReportRequest::new(
            inference.probability,
            inference.label,
            inference.images.input_images,
            Some(inference.images.gradcam),
        );
        let filename = format!(
            "prediction_report_{}.pdf",
            request.generated_at.format("%Y%m%d_%H%M%S")
        );
        let pdf = build_prediction_report_pdf(&request, &state.policy)?;
        info!(filename = %filename, bytes = pdf.len(), "Report generated");
        Ok(RenderedReport { filename, pdf })
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Report task panicked");
        ApiError::from_nowcast(NowcastError::InternalError(e.to_string()), REPORT_FAILED)
    })?
    .map_err(|e| ApiError::from_nowcast(e, REPORT_FAILED))
}
