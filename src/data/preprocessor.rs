// ============================================================
// Layer 4 — Bitmap Preprocessor
// ============================================================
// Turns a scanned bitmap into one input row for the classifier.
//
// Steps:
//   1. Decode the file and drop any alpha channel (RGB only)
//   2. Take the top-left window × window pixels (20×20)
//   3. Write them into a blank canvas at (inset, inset) so the
//      digit sits in the middle, like the training digits do
//   4. Invert and average the channels: 1 - (R + G + B) / 765
//      → white paper is 0.0, black ink is 1.0, the same scale
//        the IDX loader produces with value / 255
//   5. Flatten the canvas row-major into a 1 × (w*h) row
//
// The canvas border is left at 0.0 (blank background). If the
// scale drifts from the loader's, every prediction is biased.

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;

use crate::domain::tensor::Matrix;
use crate::infra::settings::PreprocessConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("bitmap is {width}×{height} but the crop window needs at least {window}×{window}")]
    TooSmall { width: u32, height: u32, window: usize },

    #[error("crop window {window} at inset {inset} does not fit a {canvas_width}×{canvas_height} canvas")]
    WindowOutsideCanvas { inset: usize, window: usize, canvas_width: usize, canvas_height: usize },
}

#[derive(Debug, Clone)]
pub struct BitmapPreprocessor {
    canvas_width:  usize,
    canvas_height: usize,
    inset:         usize,
    window:        usize,
}

impl BitmapPreprocessor {
    /// `rows × cols` is the canvas size the classifier was trained on.
    pub fn new(cfg: &PreprocessConfig, rows: usize, cols: usize) -> Result<Self, ImageError> {
        if cfg.inset + cfg.window > cols || cfg.inset + cfg.window > rows {
            return Err(ImageError::WindowOutsideCanvas {
                inset:         cfg.inset,
                window:        cfg.window,
                canvas_width:  cols,
                canvas_height: rows,
            });
        }
        Ok(Self { canvas_width: cols, canvas_height: rows, inset: cfg.inset, window: cfg.window })
    }

    /// Decode `path` and convert it.
    pub fn load(&self, path: &Path) -> Result<Matrix> {
        let img = image::open(path)
            .with_context(|| format!("Cannot decode bitmap '{}'", path.display()))?
            .to_rgb8();
        tracing::debug!("Decoded '{}' ({}×{})", path.display(), img.width(), img.height());
        Ok(self.preprocess(&img)?)
    }

    pub fn preprocess(&self, img: &RgbImage) -> Result<Matrix, ImageError> {
        if (img.width() as usize) < self.window || (img.height() as usize) < self.window {
            return Err(ImageError::TooSmall { width: img.width(), height: img.height(), window: self.window });
        }

        let mut canvas = Matrix::zeros(self.canvas_height, self.canvas_width);
        for y in 0..self.window {
            for x in 0..self.window {
                let [r, g, b] = img.get_pixel(x as u32, y as u32).0;
                let ink = 1.0 - (r as f32 + g as f32 + b as f32) / 765.0;
                canvas.set(y + self.inset, x + self.inset, ink);
            }
        }

        Ok(canvas.flatten())
    }
}
