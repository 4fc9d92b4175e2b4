//! Application state shared by all handlers.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use classifier::Classifier;
use report::ReportPolicy;

/// Immutable after startup; handlers receive it as `Extension<Arc<AppState>>`.
pub struct AppState {
    pub classifier: Classifier,
    pub policy: ReportPolicy,
}

impl AppState {
    pub fn new(classifier: Classifier, policy: ReportPolicy) -> Self {
        Self { classifier, policy }
    }

    /// Load the model and, if given, a report policy file.
    pub fn load(model_path: &Path, policy_path: Option<&Path>) -> Result<Self> {
        let classifier = Classifier::load(model_path)
            .with_context(|| format!("loading model weights from {}", model_path.display()))?;

        let policy = match policy_path {
            Some(path) => {
                let policy = ReportPolicy::from_file(path)
                    .with_context(|| format!("loading report policy from {}", path.display()))?;
                info!(path = %path.display(), "Loaded report policy");
                policy
            }
            None => ReportPolicy::default(),
        };

        Ok(Self::new(classifier, policy))
    }
}
