use std::path::PathBuf;

/// Hyperparameters and destination of one training run.
///
/// Built from validated command-line input and consumed once by the
/// engine's `fit`. None of these values are written to the model file.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingJob {
    pub epochs:        usize,
    pub learning_rate: f64,
    pub batch_size:    usize,
    pub output_path:   PathBuf,
}
