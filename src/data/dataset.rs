use burn::data::dataset::Dataset;

use crate::domain::sample::TrainingSample;

/// In-memory training set handed to Burn's DataLoader.
pub struct SampleDataset {
    samples: Vec<TrainingSample>,
}

impl SampleDataset {
    pub fn new(samples: Vec<TrainingSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<TrainingSample> for SampleDataset {
    fn get(&self, index: usize) -> Option<TrainingSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tensor::Matrix;

    #[test]
    fn test_get_and_len() {
        let ds = SampleDataset::new(vec![
            TrainingSample::new(Matrix::row(vec![0.1]), Matrix::one_hot(0, 2)),
            TrainingSample::new(Matrix::row(vec![0.9]), Matrix::one_hot(1, 2)),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().label(), Some(1));
        assert!(ds.get(2).is_none());
    }
}
