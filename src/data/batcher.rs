// ============================================================
// Layer 4 — Sample Batcher
// ============================================================
// Implements Burn's Batcher trait to stack TrainingSamples into
// two tensors:
//
//   inputs:  [batch_size, features]  (features = rows * cols)
//   targets: [batch_size, classes]   (one-hot rows)
//
// Every sample is already a single row of fixed width, so the
// rows are concatenated into one flat Vec and reshaped once.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::sample::TrainingSample;

#[derive(Debug, Clone)]
pub struct SampleBatch<B: Backend> {
    pub inputs:  Tensor<B, 2>,
    pub targets: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct SampleBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SampleBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Stack equally wide rows into a `[rows.len(), width]` tensor.
pub fn stack_rows<'a, B: Backend>(
    rows:   impl Iterator<Item = &'a [f32]>,
    width:  usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let flat: Vec<f32> = rows.flat_map(|r| r.iter().copied()).collect();
    let count = flat.len() / width.max(1);
    Tensor::<B, 2>::from_data(TensorData::new(flat, [count, width]), device)
}

impl<B: Backend> Batcher<TrainingSample, SampleBatch<B>> for SampleBatcher<B> {
    fn batch(&self, items: Vec<TrainingSample>) -> SampleBatch<B> {
        let features = items[0].input.cols();
        let classes  = items[0].target.cols();

        let inputs  = stack_rows::<B>(items.iter().map(|s| s.input.values()), features, &self.device);
        let targets = stack_rows::<B>(items.iter().map(|s| s.target.values()), classes, &self.device);

        SampleBatch { inputs, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tensor::Matrix;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_order() {
        let batcher = SampleBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![
            TrainingSample::new(Matrix::row(vec![0.0, 0.5, 1.0]), Matrix::one_hot(1, 2)),
            TrainingSample::new(Matrix::row(vec![1.0, 0.5, 0.0]), Matrix::one_hot(0, 2)),
        ]);

        assert_eq!(batch.inputs.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2, 2]);

        let inputs: Vec<f32> = batch.inputs.into_data().to_vec().unwrap();
        assert_eq!(inputs, vec![0.0, 0.5, 1.0, 1.0, 0.5, 0.0]);
        let targets: Vec<f32> = batch.targets.into_data().to_vec().unwrap();
        assert_eq!(targets, vec![0.0, 1.0, 1.0, 0.0]);
    }
}
