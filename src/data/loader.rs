// ============================================================
// Layer 4 — IDX Dataset Loader
// ============================================================
// Parses the MNIST IDX files into samples.
//
// File layout (all offsets in bytes):
//
//   images:  [16-byte header][rows*cols bytes][rows*cols bytes]...
//   labels:  [ 8-byte header][1 byte][1 byte]...
//
// The header also stores magic, count and dimensions, but the
// harness treats count and dimensions as configuration values
// (DatasetConfig) and only skips the header.
//
// Each pixel byte becomes value / 255.0 so that inputs live in
// [0, 1]. The bitmap preprocessor must produce the same scale.
//
// Reference: http://yann.lecun.com/exdb/mnist/ (IDX format)

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::domain::{
    sample::{EvaluationSample, TrainingSample},
    tensor::Matrix,
    traits::{LoadRequest, LoadedSplits, SampleSource},
};
use crate::infra::settings::DatasetConfig;

/// Byte layout shared by every IDX file pair of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdxLayout {
    pub image_header_len: usize,
    pub label_header_len: usize,
    pub rows:             usize,
    pub cols:             usize,
    pub classes:          usize,
}

impl IdxLayout {
    pub fn record_len(&self) -> usize {
        self.rows * self.cols
    }
}

impl From<&DatasetConfig> for IdxLayout {
    fn from(cfg: &DatasetConfig) -> Self {
        Self {
            image_header_len: cfg.image_header_len,
            label_header_len: cfg.label_header_len,
            rows:             cfg.rows,
            cols:             cfg.cols,
            classes:          cfg.classes,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("{what} buffer is truncated: {count} records need {expected} bytes, found {actual}")]
    Truncated {
        what:     &'static str,
        count:    usize,
        expected: usize,
        actual:   usize,
    },

    #[error("label {label} of record {index} is outside 0..{classes}")]
    LabelOutOfRange {
        index:   usize,
        label:   u8,
        classes: usize,
    },
}

/// Decode `count` image records into normalised `1 × rows*cols` rows.
pub fn parse_images(bytes: &[u8], count: usize, layout: &IdxLayout) -> Result<Vec<Matrix>, DatasetError> {
    let record   = layout.record_len();
    let expected = layout.image_header_len + count * record;
    if bytes.len() < expected {
        return Err(DatasetError::Truncated { what: "image", count, expected, actual: bytes.len() });
    }

    let images = bytes[layout.image_header_len..expected]
        .chunks_exact(record)
        .map(|pixels| Matrix::row(pixels.iter().map(|&p| p as f32 / 255.0).collect()))
        .collect();

    Ok(images)
}

/// Slice out `count` label bytes, rejecting any label outside the class range.
pub fn parse_labels<'a>(bytes: &'a [u8], count: usize, layout: &IdxLayout) -> Result<&'a [u8], DatasetError> {
    let expected = layout.label_header_len + count;
    if bytes.len() < expected {
        return Err(DatasetError::Truncated { what: "label", count, expected, actual: bytes.len() });
    }

    let labels = &bytes[layout.label_header_len..expected];
    if let Some((index, &label)) = labels
        .iter()
        .enumerate()
        .find(|(_, l)| **l as usize >= layout.classes)
    {
        return Err(DatasetError::LabelOutOfRange { index, label, classes: layout.classes });
    }

    Ok(labels)
}

/// Training samples: labels expanded to one-hot rows of width `classes`.
pub fn parse_training(
    images: &[u8],
    labels: &[u8],
    count:  usize,
    layout: &IdxLayout,
) -> Result<Vec<TrainingSample>, DatasetError> {
    let inputs = parse_images(images, count, layout)?;
    let labels = parse_labels(labels, count, layout)?;

    Ok(inputs
        .into_iter()
        .zip(labels)
        .map(|(input, &label)| TrainingSample::new(input, Matrix::one_hot(label as usize, layout.classes)))
        .collect())
}

/// Evaluation samples: labels kept as raw integers.
pub fn parse_evaluation(
    images: &[u8],
    labels: &[u8],
    count:  usize,
    layout: &IdxLayout,
) -> Result<Vec<EvaluationSample>, DatasetError> {
    let inputs = parse_images(images, count, layout)?;
    let labels = parse_labels(labels, count, layout)?;

    Ok(inputs
        .into_iter()
        .zip(labels)
        .map(|(input, &label)| EvaluationSample::new(input, label))
        .collect())
}

/// Reads the configured IDX files from disk.
pub struct IdxLoader {
    config: DatasetConfig,
}

impl IdxLoader {
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    pub fn layout(&self) -> IdxLayout {
        IdxLayout::from(&self.config)
    }
}

impl SampleSource for IdxLoader {
    fn load(&self, request: LoadRequest) -> Result<LoadedSplits> {
        let cfg    = &self.config;
        let layout = self.layout();
        let mut splits = LoadedSplits::default();

        if request.training {
            let images = read_file(&cfg.train_images_path())?;
            let labels = read_file(&cfg.train_labels_path())?;
            splits.training = parse_training(&images, &labels, cfg.train_count, &layout)
                .with_context(|| format!("Cannot parse training set in '{}'", cfg.data_dir.display()))?;
            tracing::info!("Loaded {} training samples", splits.training.len());
        }

        if request.testing {
            let images = read_file(&cfg.test_images_path())?;
            let labels = read_file(&cfg.test_labels_path())?;
            splits.testing = parse_evaluation(&images, &labels, cfg.test_count, &layout)
                .with_context(|| format!("Cannot parse test set in '{}'", cfg.data_dir.display()))?;
            tracing::info!("Loaded {} test samples", splits.testing.len());
        }

        Ok(splits)
    }
}

/// Whole-file read; the dataset is small enough to keep in memory.
fn read_file(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read dataset file '{}'", path.display()))?;
    tracing::debug!("Read {} bytes from '{}'", bytes.len(), path.display());
    Ok(bytes)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_layout() -> IdxLayout {
        IdxLayout { image_header_len: 16, label_header_len: 8, rows: 2, cols: 3, classes: 10 }
    }

    fn image_file(records: &[&[u8]]) -> Vec<u8> {
        let mut bytes = vec![0u8; 16];
        for r in records {
            bytes.extend_from_slice(r);
        }
        bytes
    }

    fn label_file(labels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; 8];
        bytes.extend_from_slice(labels);
        bytes
    }

    #[test]
    fn test_white_pixels_normalise_to_one_and_label_is_one_hot() {
        let layout  = tiny_layout();
        let images  = image_file(&[&[255; 6]]);
        let labels  = label_file(&[7]);
        let samples = parse_training(&images, &labels, 1, &layout).unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].input.shape(), (1, 6));
        assert!(samples[0].input.values().iter().all(|&v| v == 1.0));

        let target = samples[0].target.values();
        assert_eq!(target.len(), 10);
        assert_eq!(target[7], 1.0);
        assert_eq!(target.iter().filter(|&&v| v == 1.0).count(), 1);
        assert_eq!(target.iter().filter(|&&v| v == 0.0).count(), 9);
    }

    #[test]
    fn test_pixel_scaling_and_record_order() {
        let layout = tiny_layout();
        let images = image_file(&[&[0, 51, 102, 153, 204, 255], &[255, 0, 0, 0, 0, 0]]);
        let labels = label_file(&[1, 2]);
        let tests  = parse_evaluation(&images, &labels, 2, &layout).unwrap();

        assert_eq!(tests[0].input.values(), &[0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(tests[0].label, 1);
        assert_eq!(tests[1].input.values()[0], 1.0);
        assert_eq!(tests[1].label, 2);
    }

    #[test]
    fn test_truncated_images_are_rejected() {
        let layout = tiny_layout();
        let images = image_file(&[&[1; 6], &[1; 3]]);
        let labels = label_file(&[0, 0]);
        let err = parse_training(&images, &labels, 2, &layout).unwrap_err();
        assert_eq!(
            err,
            DatasetError::Truncated { what: "image", count: 2, expected: 28, actual: 25 }
        );
    }

    #[test]
    fn test_truncated_labels_are_rejected() {
        let layout = tiny_layout();
        let images = image_file(&[&[1; 6], &[1; 6]]);
        let labels = label_file(&[0]);
        assert!(matches!(
            parse_evaluation(&images, &labels, 2, &layout),
            Err(DatasetError::Truncated { what: "label", .. })
        ));
    }

    #[test]
    fn test_label_outside_class_range() {
        let layout = tiny_layout();
        let images = image_file(&[&[1; 6]]);
        let labels = label_file(&[10]);
        assert_eq!(
            parse_training(&images, &labels, 1, &layout).unwrap_err(),
            DatasetError::LabelOutOfRange { index: 0, label: 10, classes: 10 }
        );
    }

    #[test]
    fn test_extra_trailing_records_are_ignored() {
        let layout = tiny_layout();
        let images = image_file(&[&[1; 6], &[2; 6]]);
        let labels = label_file(&[3, 4]);
        assert_eq!(parse_evaluation(&images, &labels, 1, &layout).unwrap().len(), 1);
    }

    fn tiny_config(dir: &Path) -> DatasetConfig {
        DatasetConfig {
            data_dir:    dir.to_path_buf(),
            rows:        2,
            cols:        3,
            train_count: 2,
            test_count:  1,
            ..DatasetConfig::default()
        }
    }

    #[test]
    fn test_testing_only_never_opens_training_files() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        // Only the test files exist; touching the training files would fail.
        fs::write(cfg.test_images_path(), image_file(&[&[255; 6]])).unwrap();
        fs::write(cfg.test_labels_path(), label_file(&[5])).unwrap();

        let splits = IdxLoader::new(cfg).load(LoadRequest::testing_only()).unwrap();
        assert!(splits.training.is_empty());
        assert_eq!(splits.testing.len(), 1);
        assert_eq!(splits.testing[0].label, 5);
    }

    #[test]
    fn test_both_splits_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        fs::write(cfg.train_images_path(), image_file(&[&[0; 6], &[255; 6]])).unwrap();
        fs::write(cfg.train_labels_path(), label_file(&[0, 9])).unwrap();
        fs::write(cfg.test_images_path(), image_file(&[&[255; 6]])).unwrap();
        fs::write(cfg.test_labels_path(), label_file(&[5])).unwrap();

        let splits = IdxLoader::new(cfg).load(LoadRequest::both()).unwrap();
        assert_eq!(splits.training.len(), 2);
        assert_eq!(splits.training[1].label(), Some(9));
        assert_eq!(splits.testing.len(), 1);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = IdxLoader::new(tiny_config(dir.path()))
            .load(LoadRequest::both())
            .unwrap_err();
        assert!(err.to_string().contains("train-images.idx3-ubyte"));
    }
}
