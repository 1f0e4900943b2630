#![allow(dead_code)]

use image::DynamicImage;
use iou_robustness::dataset::synthetic;
use iou_robustness::{ClassificationResult, Classifier, ClassifyError, ColorClassifier, DirectoryDataset};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

/// Colour constants for tests
pub const RED: [u8; 3] = [220, 30, 30];
pub const GREEN: [u8; 3] = [30, 200, 40];
pub const BLUE: [u8; 3] = [20, 40, 230];

/// Writes a synthetic dataset of `per_class` 100x100 images per class.
/// Returns the dataset and the temp directory (which must be kept alive).
pub fn create_test_dataset(classes: &[(&str, [u8; 3])], per_class: usize) -> (DirectoryDataset, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    synthetic::write_dataset(dir.path(), classes, per_class, 100)
        .expect("Failed to write synthetic dataset");
    (DirectoryDataset::new(dir.path()), dir)
}

/// Classifier that knows the colours of red/green/blue test classes.
pub fn rgb_classifier() -> ColorClassifier {
    ColorClassifier::new()
        .with_prototype("red", [255, 0, 0])
        .with_prototype("green", [0, 255, 0])
        .with_prototype("blue", [0, 0, 255])
}

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Backend whose model never produces any output.
pub struct SilentClassifier;

impl Classifier for SilentClassifier {
    fn classify(&self, _image: &DynamicImage) -> Result<ClassificationResult, ClassifyError> {
        Err(ClassifyError::NoResult)
    }

    fn name(&self) -> &str {
        "silent"
    }
}
