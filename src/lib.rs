pub mod classifier;
pub mod config;
pub mod dataset;
pub mod distortion;
pub mod error;
pub mod geometry;
pub mod harness;
pub mod models;

pub use classifier::{Classifier, ColorClassifier, FixedClassifier, RtenClassifier};
pub use dataset::{Dataset, DirectoryDataset};
pub use distortion::{distort_image, ClampBounds, DistortionConfig};
pub use error::{ClassifyError, GeometryError, LoadError};
pub use geometry::{closest_by_iou, from_normalized_box, iou, Rectangle};
pub use harness::{evaluate, evaluate_parallel, BucketKey, BucketStats};
pub use models::{ClassificationResult, DatasetEntry};
