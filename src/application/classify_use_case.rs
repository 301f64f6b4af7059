// ============================================================
// Layer 2 — Classify Use Case
// ============================================================
// One bitmap in, one digit out. Never touches the dataset.

use anyhow::{Context, Result};
use std::path::Path;

use crate::application::evaluate_use_case::argmax;
use crate::data::preprocessor::BitmapPreprocessor;
use crate::domain::traits::Classifier;

pub struct ClassifyUseCase<'a> {
    preprocessor: &'a BitmapPreprocessor,
}

impl<'a> ClassifyUseCase<'a> {
    pub fn new(preprocessor: &'a BitmapPreprocessor) -> Self {
        Self { preprocessor }
    }

    pub fn execute<C: Classifier + ?Sized>(&self, classifier: &C, image: &Path) -> Result<usize> {
        let input  = self.preprocessor.load(image)?;
        let output = classifier
            .forward(&input)
            .with_context(|| format!("Cannot classify '{}'", image.display()))?;

        let digit = argmax(output.values());
        tracing::debug!("'{}' → {:?} → {}", image.display(), output.values(), digit);
        Ok(digit)
    }
}
