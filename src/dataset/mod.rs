pub mod synthetic;

use anyhow::Context;
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::models::DatasetEntry;

/// Source of labeled images.
pub trait Dataset: Send + Sync {
    /// List every labeled image. Failing here aborts the run.
    fn entries(&self) -> anyhow::Result<Vec<DatasetEntry>>;

    /// Decode the image behind one entry.
    fn load(&self, entry: &DatasetEntry) -> Result<DynamicImage, LoadError>;
}

/// Two-level directory layout: `root/<label>/<file>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirectoryDataset {
    root: PathBuf,
    extension: String,
}

impl DirectoryDataset {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "png".to_string(),
        }
    }

    /// Only pick up files with this extension (case-insensitive)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

impl Dataset for DirectoryDataset {
    fn entries(&self) -> anyhow::Result<Vec<DatasetEntry>> {
        let mut categories = Vec::new();
        for entry in std::fs::read_dir(&self.root)
            .with_context(|| format!("failed to read dataset root {}", self.root.display()))?
        {
            // Follows symlinks, unlike `DirEntry::file_type`.
            let path = entry?.path();
            if path.is_dir() {
                categories.push(path);
            }
        }
        categories.sort();

        let mut entries = Vec::new();
        for category in categories {
            let label = match category.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };

            let mut files = Vec::new();
            for entry in std::fs::read_dir(&category)
                .with_context(|| format!("failed to read category {}", category.display()))?
            {
                let path = entry?.path();
                if path.is_file() && self.has_extension(&path) {
                    files.push(path);
                }
            }
            files.sort();

            entries.extend(files.into_iter().map(|path| DatasetEntry {
                label: label.clone(),
                path,
            }));
        }

        Ok(entries)
    }

    fn load(&self, entry: &DatasetEntry) -> Result<DynamicImage, LoadError> {
        Ok(ImageReader::open(&entry.path)?.with_guessed_format()?.decode()?)
    }
}
