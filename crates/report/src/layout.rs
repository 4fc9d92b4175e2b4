//! Report content and page layout.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

use nowcast_common::{PredictionLabel, RiskTier};

use crate::error::{ReportError, ReportResult};
use crate::pdf::{Font, PageContent, PdfDocument};
use crate::policy::ReportPolicy;
use crate::text::{text_width, wrap};

/// Panel captions, left to right.
pub const PANEL_TITLES: [&str; 4] = [
    "Input Frame 1 (Oldest)",
    "Input Frame 2",
    "Input Frame 3 (Latest)",
    "Grad-CAM Overlay",
];

/// Drawn in place of a missing or undecodable image.
pub const PLACEHOLDER_TEXT: &str = "Image not available";

// 8 × 10 inch page, in points
const PAGE_WIDTH: f32 = 576.0;
const PAGE_HEIGHT: f32 = 720.0;
const MARGIN_X: f32 = 0.08 * PAGE_WIDTH;
const LINE_SPACING: f32 = 1.2;

/// Inputs for one report.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub probability: f32,
    pub label: PredictionLabel,
    /// Base64 PNGs of the input frames, oldest first. Only the first three
    /// are used.
    pub input_images: Vec<String>,
    /// Base64 PNG of the Grad-CAM overlay.
    pub gradcam: Option<String>,
    pub generated_at: NaiveDateTime,
}

impl ReportRequest {
    /// Request stamped with the current local time.
    pub fn new(
        probability: f32,
        label: PredictionLabel,
        input_images: Vec<String>,
        gradcam: Option<String>,
    ) -> Self {
        Self {
            probability,
            label,
            input_images,
            gradcam,
            generated_at: Local::now().naive_local(),
        }
    }

    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = at;
        self
    }
}

/// Text of a report after policy selection and wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    pub title: String,
    pub metadata: Vec<String>,
    pub risk_tier: RiskTier,
    /// `(heading, wrapped lines)`
    pub sections: Vec<(String, Vec<String>)>,
    pub note: String,
}

impl ReportContent {
    pub fn new(request: &ReportRequest, policy: &ReportPolicy) -> ReportResult<Self> {
        let p = request.probability;
        if !p.is_finite() {
            return Err(ReportError::InvalidProbability(p));
        }
        let risk_tier = policy.risk_tier(p);

        let metadata = vec![
            format!("Generated At: {}", request.generated_at.format("%Y-%m-%d %H:%M:%S")),
            format!("Prediction: {}", request.label),
            format!("Heavy Rain Probability: {:.2}%", p as f64 * 100.0),
            format!("Risk Level: {risk_tier}"),
            format!("Model: {}", policy.model_description),
        ];

        let width = policy.wrap_width;
        let sections = vec![
            (
                "Prediction Explanation".to_string(),
                wrap(policy.explanation(p, request.label), width),
            ),
            ("Interpretation Notes".to_string(), wrap(&policy.interpretation, width)),
            ("Potential Failure Cases".to_string(), wrap(&policy.failure_cases, width)),
        ];

        Ok(Self {
            title: policy.title.clone(),
            metadata,
            risk_tier,
            sections,
            note: policy.usage_note.clone(),
        })
    }
}

struct Panel {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

fn decode_panel(index: usize, encoded: Option<&str>) -> Option<Panel> {
    let encoded = encoded.filter(|s| !s.is_empty())?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| e.to_string())
        .and_then(|bytes| image::load_from_memory(&bytes).map_err(|e| e.to_string()));

    match decoded {
        Ok(img) => {
            let rgb = img.to_rgb8();
            Some(Panel {
                width: rgb.width(),
                height: rgb.height(),
                rgb: rgb.into_raw(),
            })
        }
        Err(error) => {
            warn!(panel = index, error = %error, "Report image could not be decoded");
            None
        }
    }
}

/// Render the one-page PDF report.
///
/// Missing or undecodable images are replaced by a placeholder; the report
/// itself only fails on a non-finite probability or an internal write error.
pub fn build_prediction_report_pdf(request: &ReportRequest, policy: &ReportPolicy) -> ReportResult<Vec<u8>> {
    let content = ReportContent::new(request, policy)?;

    let mut sources: Vec<Option<&str>> = request.input_images.iter().take(3).map(|s| Some(s.as_str())).collect();
    sources.resize(3, None);
    sources.push(request.gradcam.as_deref());

    let panels: Vec<Option<Panel>> = sources
        .into_iter()
        .enumerate()
        .map(|(i, src)| decode_panel(i, src))
        .collect();

    let mut doc = PdfDocument::new();
    doc.set_info(&content.title, &request.generated_at.format("%Y%m%d%H%M%S").to_string());

    let mut page = PageContent::default();
    draw_text(&mut page, &content);

    for (i, (title, panel)) in PANEL_TITLES.iter().zip(&panels).enumerate() {
        let x = (0.05 + i as f32 * 0.23) * PAGE_WIDTH;
        let (box_w, box_h) = (0.20 * PAGE_WIDTH, 0.20 * PAGE_HEIGHT);
        let box_y = 0.08 * PAGE_HEIGHT;

        let image_top = match panel {
            Some(panel) => {
                let scale = (box_w / panel.width as f32).min(box_h / panel.height as f32);
                let (w, h) = (panel.width as f32 * scale, panel.height as f32 * scale);
                let (ix, iy) = (x + (box_w - w) / 2.0, box_y + (box_h - h) / 2.0);
                let id = doc.add_rgb_image(panel.width, panel.height, &panel.rgb)?;
                page.image(id, ix, iy, w, h);
                iy + h
            }
            None => {
                let cy = box_y + box_h / 2.0;
                centered(&mut page, Font::Regular, 8.0, x + box_w / 2.0, cy - 3.0, PLACEHOLDER_TEXT);
                box_y + (box_h + box_w) / 2.0
            }
        };
        centered(&mut page, Font::Regular, 8.0, x + box_w / 2.0, image_top + 4.0, title);
    }

    doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, page);
    let bytes = doc.finish();

    debug!(
        bytes = bytes.len(),
        risk = %content.risk_tier,
        missing_images = panels.iter().filter(|p| p.is_none()).count(),
        "Report rendered"
    );
    Ok(bytes)
}

fn draw_text(page: &mut PageContent, content: &ReportContent) {
    centered(page, Font::Bold, 16.0, PAGE_WIDTH / 2.0, 0.97 * PAGE_HEIGHT - 16.0, &content.title);

    block(page, Font::Regular, 10.0, 0.90, &content.metadata);

    let anchors = [(0.76, 0.72), (0.62, 0.58), (0.50, 0.46)];
    for ((heading, lines), (heading_y, body_y)) in content.sections.iter().zip(anchors) {
        block(page, Font::Bold, 12.0, heading_y, std::slice::from_ref(heading));
        block(page, Font::Regular, 10.0, body_y, lines);
    }

    page.text(Font::Italic, 9.0, MARGIN_X, 0.40 * PAGE_HEIGHT, &content.note);
}

/// Lines hanging from a top edge at `top` (fraction of page height).
fn block(page: &mut PageContent, font: Font, size: f32, top: f32, lines: &[String]) {
    let mut y = top * PAGE_HEIGHT - size;
    for line in lines {
        page.text(font, size, MARGIN_X, y, line);
        y -= size * LINE_SPACING;
    }
}

fn centered(page: &mut PageContent, font: Font, size: f32, cx: f32, y: f32, text: &str) {
    let x = cx - text_width(text, size) / 2.0;
    page.text(font, size, x, y, text);
}
