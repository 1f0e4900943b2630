use serde::Serialize;
use std::path::PathBuf;

/// Top-1 answer of a classifier for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: String,
    /// Probability of `label`, in `[0, 1]`.
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn is_correct(&self, ground_truth: &str) -> bool {
        self.label == ground_truth
    }
}

/// One labeled image of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    /// Ground-truth label, taken from the category directory name.
    pub label: String,
    pub path: PathBuf,
}

impl DatasetEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
