use image::DynamicImage;

use crate::classifier::{ensure_not_empty, Classifier};
use crate::error::ClassifyError;
use crate::models::ClassificationResult;

/// Largest possible distance between two RGB colours.
const MAX_DISTANCE: f32 = 441.672_96;

/// Nearest-prototype classifier on the mean colour of an image.
///
/// Needs no model file, which makes it useful for smoke runs over the
/// synthetic datasets written by [`crate::dataset::synthetic`].
#[derive(Debug, Clone, Default)]
pub struct ColorClassifier {
    prototypes: Vec<(String, [u8; 3])>,
}

impl ColorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prototype(mut self, label: impl Into<String>, color: [u8; 3]) -> Self {
        self.prototypes.push((label.into(), color));
        self
    }

    /// Calculate the average colour of all pixels
    pub fn mean_color(img: &DynamicImage) -> [f32; 3] {
        let rgb = img.to_rgb8();
        let mut sum = [0u64; 3];
        for pixel in rgb.pixels() {
            for c in 0..3 {
                sum[c] += pixel[c] as u64;
            }
        }

        let count = (rgb.width() as u64 * rgb.height() as u64).max(1) as f32;
        [sum[0] as f32 / count, sum[1] as f32 / count, sum[2] as f32 / count]
    }
}

impl Classifier for ColorClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationResult, ClassifyError> {
        ensure_not_empty(image)?;

        let mean = Self::mean_color(image);
        let distance = |color: &[u8; 3]| -> f32 {
            (0..3)
                .map(|c| (mean[c] - color[c] as f32).powi(2))
                .sum::<f32>()
                .sqrt()
        };

        let mut best: Option<(&str, f32)> = None;
        for (label, color) in &self.prototypes {
            let d = distance(color);
            match best {
                Some((_, current)) if d >= current => {}
                _ => best = Some((label.as_str(), d)),
            }
        }

        let (label, d) = best.ok_or(ClassifyError::NoResult)?;
        Ok(ClassificationResult::new(label, 1.0 - d / MAX_DISTANCE))
    }

    fn name(&self) -> &str {
        "color"
    }
}

/// Always answers with the same label.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    pub label: String,
    pub confidence: f32,
}

impl FixedClassifier {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: 1.0,
        }
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationResult, ClassifyError> {
        ensure_not_empty(image)?;
        Ok(ClassificationResult::new(self.label.clone(), self.confidence))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
