use anyhow::Context;
use image::DynamicImage;
use log::info;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::NdTensor;
use std::path::Path;

use crate::classifier::{ensure_not_empty, preprocessing, Classifier};
use crate::config::{ClassifierConfig, Device};
use crate::error::ClassifyError;
use crate::models::ClassificationResult;

/// Classifier running a converted `.rten` classification network.
pub struct RtenClassifier {
    model: Model,
    labels: Vec<String>,
    config: ClassifierConfig,
}

/// Read one label per line, skipping blank lines
pub fn load_labels(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read label file {}", path.display()))?;
    let labels: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        anyhow::bail!("label file {} is empty", path.display());
    }
    Ok(labels)
}

impl RtenClassifier {
    /// Load the model and its labels.
    ///
    /// The runtime executes on the CPU only, so requesting the GPU is a
    /// configuration error.
    pub fn new(config: ClassifierConfig) -> anyhow::Result<Self> {
        if config.device != Device::Cpu {
            anyhow::bail!("device '{}' is not supported by the rten runtime, use cpu", config.device);
        }

        let model_path = &config.paths.model;
        if !model_path.exists() {
            anyhow::bail!(
                "Model not found. Convert the trained weights to .rten first.\n\
                 Expected location:\n  - {}",
                model_path.display()
            );
        }

        let model = Model::load_file(model_path)
            .with_context(|| format!("failed to load model {}", model_path.display()))?;
        let labels = load_labels(&config.paths.labels)?;

        info!(
            "Model {} initialized with batch size {} on device {} ({} labels)",
            model_path.display(),
            config.batch_size,
            config.device,
            labels.len()
        );

        Ok(Self {
            model,
            labels,
            config,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn run(&self, input: NdTensor<f32, 4>) -> Result<Vec<f32>, ClassifyError> {
        let output = self
            .model
            .run_one(input.view().into(), None)
            .map_err(|e| anyhow::anyhow!("model run failed: {}", e))?;
        let scores: NdTensor<f32, 2> = output
            .try_into()
            .map_err(|e| anyhow::anyhow!("unexpected model output: {}", e))?;

        Ok(scores.to_vec())
    }
}

impl Classifier for RtenClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationResult, ClassifyError> {
        ensure_not_empty(image)?;

        let (width, height) = self.config.resize;
        let resized = preprocessing::resize(image, width, height);
        let scores = self.run(preprocessing::to_tensor(&[resized]))?;

        let probs = preprocessing::to_probabilities(&scores);
        let (idx, confidence) = preprocessing::top1(&probs).ok_or(ClassifyError::NoResult)?;
        let label = self.labels.get(idx).ok_or_else(|| {
            anyhow::anyhow!("model predicted class {} but only {} labels are known", idx, self.labels.len())
        })?;

        Ok(ClassificationResult::new(label.clone(), confidence))
    }

    fn name(&self) -> &str {
        "rten"
    }
}
