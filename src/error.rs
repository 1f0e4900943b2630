use thiserror::Error;

/// Errors raised by the box-matching helpers.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("no candidate boxes to compare against")]
    EmptyInput,
}

/// Errors a classifier backend can report for a single image.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The model ran but produced no output at all.
    #[error("model did not return any results")]
    NoResult,

    #[error("image has zero width or height")]
    EmptyImage,

    #[error("inference failed: {0}")]
    Inference(#[from] anyhow::Error),
}

/// Errors raised while loading one dataset image.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}
