use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_BATCH_SIZE: usize = 16;
pub const DEFAULT_RESIZE: (u32, u32) = (640, 640);

/// Pretrained classification network size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    Yolon,
    Yolos,
    Yolom,
    Yolol,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Yolon => "yolon",
            Variant::Yolos => "yolos",
            Variant::Yolom => "yolom",
            Variant::Yolol => "yolol",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatasetName {
    Shvn,
    CocoAnimal,
}

impl DatasetName {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetName::Shvn => "shvn",
            DatasetName::CocoAnimal => "coco-animal",
        }
    }

    /// Validation split of this dataset under `datasets_dir`.
    pub fn default_root(&self, datasets_dir: &Path) -> PathBuf {
        datasets_dir.join(self.as_str()).join("val")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Gpu => write!(f, "gpu"),
        }
    }
}

/// Files making up one converted model: the network and its label list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub model: PathBuf,
    pub labels: PathBuf,
}

impl ModelPaths {
    /// `<models_dir>/<variant>-cls-<dataset>.rten` and the matching `.labels` file.
    pub fn resolve(models_dir: &Path, variant: Variant, dataset: DatasetName) -> Self {
        let stem = format!("{}-cls-{}", variant.as_str(), dataset.as_str());
        Self {
            model: models_dir.join(format!("{}.rten", stem)),
            labels: models_dir.join(format!("{}.labels", stem)),
        }
    }
}

/// Settings for a model-backed classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub paths: ModelPaths,
    pub device: Device,
    pub batch_size: usize,
    /// Input size `(width, height)` images are resized to before inference.
    pub resize: (u32, u32),
}

impl ClassifierConfig {
    pub fn new(paths: ModelPaths) -> Self {
        Self {
            paths,
            device: Device::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            resize: DEFAULT_RESIZE,
        }
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_resize(mut self, width: u32, height: u32) -> Self {
        self.resize = (width, height);
        self
    }
}

/// Parse a `WIDTHxHEIGHT` size such as `640x640`.
pub fn parse_size(value: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width: u32 = w.trim().parse()?;
    let height: u32 = h.trim().parse()?;
    if width == 0 || height == 0 {
        anyhow::bail!("size must be non-zero, got {}x{}", width, height);
    }
    Ok((width, height))
}
