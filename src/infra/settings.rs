// ============================================================
// Layer 6 — Harness Settings
// ============================================================
// Every value that used to be a literal in the training program
// (dataset file names, image dimensions, crop window, default
// architecture, seed) lives here, with defaults matching the
// standard MNIST setup.
//
// Settings are optional: with no --config flag the defaults are
// used as-is. A config file only needs the keys it overrides,
// because every struct carries #[serde(default)].
//
// Example:
//   {
//     "dataset":      { "data_dir": "/data/mnist" },
//     "architecture": { "template": "Mlp" },
//     "training":     { "seed": 7, "metrics_dir": "runs" }
//   }

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::layer::Activation;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub dataset:      DatasetConfig,
    pub preprocess:   PreprocessConfig,
    pub architecture: ArchitectureConfig,
    pub training:     TrainingConfig,
}

/// Location and fixed layout of the IDX files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub data_dir:         PathBuf,
    pub train_images:     String,
    pub train_labels:     String,
    pub test_images:      String,
    pub test_labels:      String,
    pub image_header_len: usize,
    pub label_header_len: usize,
    pub rows:             usize,
    pub cols:             usize,
    pub train_count:      usize,
    pub test_count:       usize,
    pub classes:          usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir:         PathBuf::from("."),
            train_images:     "train-images.idx3-ubyte".to_string(),
            train_labels:     "train-labels.idx1-ubyte".to_string(),
            test_images:      "t10k-images.idx3-ubyte".to_string(),
            test_labels:      "t10k-labels.idx1-ubyte".to_string(),
            image_header_len: 16,
            label_header_len: 8,
            rows:             28,
            cols:             28,
            train_count:      60_000,
            test_count:       10_000,
            classes:          10,
        }
    }
}

impl DatasetConfig {
    pub fn train_images_path(&self) -> PathBuf { self.data_dir.join(&self.train_images) }

    pub fn train_labels_path(&self) -> PathBuf { self.data_dir.join(&self.train_labels) }

    pub fn test_images_path(&self) -> PathBuf { self.data_dir.join(&self.test_images) }

    pub fn test_labels_path(&self) -> PathBuf { self.data_dir.join(&self.test_labels) }
}

/// Placement of a scanned bitmap inside the dataset canvas.
///
/// The top-left `window × window` pixels of the bitmap are written into
/// the canvas starting at (`inset`, `inset`). The defaults centre a
/// 20×20 digit in a 28×28 canvas, the way MNIST digits are centred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub inset:  usize,
    pub window: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { inset: 4, window: 20 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Template {
    /// Conv → Pool → Conv → Pool → Dense × 4
    #[default]
    LeNet,
    /// Dense × 4
    Mlp,
}

/// The architecture `new` starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchitectureConfig {
    pub template:        Template,
    pub activation:      Activation,
    pub learnable_scale: bool,
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        Self {
            template:        Template::LeNet,
            activation:      Activation::LeakyRelu,
            learnable_scale: true,
        }
    }
}

/// Engine-side knobs that are not part of the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub seed:        u64,
    pub num_workers: usize,
    pub leaky_slope: f64,
    /// When set, per-epoch metrics are appended to `<dir>/metrics.csv`.
    pub metrics_dir: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed:        42,
            num_workers: 1,
            leaky_slope: 0.01,
            metrics_dir: None,
        }
    }
}

impl HarnessConfig {
    /// Read settings from a JSON file, or fall back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read settings from '{}'", path.display()))?;

        let cfg: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid settings in '{}'", path.display()))?;

        tracing::debug!("Loaded settings from '{}'", path.display());
        Ok(cfg)
    }

    /// Point the dataset at another directory, keeping the file names.
    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.dataset.data_dir = dir;
        }
        self
    }
}
