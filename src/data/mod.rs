// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the files on disk and the tensors the
// engine consumes:
//
//   IDX files ──▶ IdxLoader ──▶ TrainingSample / EvaluationSample
//                                        │
//   bitmap ──▶ BitmapPreprocessor ──▶ Matrix (1 × 784)
//                                        │
//                                        ▼
//                        SampleDataset ──▶ SampleBatcher ──▶ DataLoader
//
// The loader and the preprocessor must agree on the [0, 1]
// pixel scale; the batcher only stacks rows.

/// Parses the IDX image/label files into samples
pub mod loader;

/// Converts a bitmap into a normalised input row
pub mod preprocessor;

/// Implements Burn's Dataset trait for training samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
