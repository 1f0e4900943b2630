pub mod color;
pub mod preprocessing;
pub mod network;

use image::DynamicImage;

use crate::error::ClassifyError;
use crate::models::ClassificationResult;

pub use color::{ColorClassifier, FixedClassifier};
pub use network::RtenClassifier;

/// Trait that every classification backend implements.
pub trait Classifier: Send + Sync {
    /// Predict the label of a decoded image.
    ///
    /// Fails with [`ClassifyError::EmptyImage`] for images without pixels and
    /// [`ClassifyError::NoResult`] when the backend produces no answer. A
    /// low-confidence answer is still `Ok`.
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationResult, ClassifyError>;

    /// Human-readable backend name (used in log output)
    fn name(&self) -> &str;
}

/// Reject images that have no pixels to classify.
pub fn ensure_not_empty(image: &DynamicImage) -> Result<(), ClassifyError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ClassifyError::EmptyImage);
    }
    Ok(())
}
