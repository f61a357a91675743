use std::path::PathBuf;

use crate::shared::constants::DEFAULT_MIN_CONFIDENCE;

/// Settings shared by every engine backend.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendConfig {
    /// Detections scoring below this are discarded.
    pub min_confidence: f64,
    /// Directory searched for model files before the user cache.
    pub model_dir: Option<PathBuf>,
    /// Whether missing models may be fetched over the network.
    pub allow_download: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            model_dir: None,
            allow_download: true,
        }
    }
}
