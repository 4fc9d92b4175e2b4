//! PDF prediction reports.
//!
//! [`build_prediction_report_pdf`] lays out a single page: title, metadata,
//! three explanatory paragraphs, a usage note and a strip of four images
//! (three input frames and the Grad-CAM overlay). Wording and risk
//! thresholds come from a [`ReportPolicy`].

pub mod error;
pub mod layout;
pub mod pdf;
pub mod policy;
pub mod text;

pub use error::{ReportError, ReportResult};
pub use layout::{build_prediction_report_pdf, ReportContent, ReportRequest, PANEL_TITLES, PLACEHOLDER_TEXT};
pub use policy::{ExplanationTemplates, ReportPolicy};
