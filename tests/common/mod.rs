mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from iou_robustness for tests
pub use iou_robustness::{
    evaluate, evaluate_parallel, BucketKey, BucketStats, ClassificationResult, Classifier,
    ClassifyError, ColorClassifier, Dataset, DatasetEntry, DirectoryDataset, DistortionConfig,
    FixedClassifier, Rectangle,
};
