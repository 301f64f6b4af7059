// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific code lives here. Other layers see a model
// only through the ComputeEngine and Classifier traits.
//
//   architecture.rs — the layer stacks `new` starts from
//                     (LeNet-style CNN or a small MLP)
//
//   model.rs        — Burn modules for convolution, pooling and
//                     dense layers, the forward pass, and
//                     import/export of learned parameters
//
//   trainer.rs      — mini-batch loop: MSE against one-hot
//                     targets, backward pass, Adam step
//
//   engine.rs       — BurnEngine, the ComputeEngine the CLI uses
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            LeCun et al. (1998) Gradient-Based Learning

pub mod architecture;

pub mod model;

/// Training loop with per-epoch metrics
pub mod trainer;

pub mod engine;

/// Backend used for the forward pass and as the autodiff inner backend.
#[cfg(not(feature = "wgpu"))]
pub type ComputeBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type ComputeBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<ComputeBackend>;
