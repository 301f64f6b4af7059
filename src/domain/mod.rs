// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what the harness works
// with: matrices, samples, layer specifications and the seams
// to the compute engine, the sample source and the reporter.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Everything above this layer (application, cli) programs
// against these types; everything below (data, ml, infra)
// produces or consumes them.

// Row-major f32 buffer with a fixed (rows, cols) shape
pub mod tensor;

// Training / evaluation samples and evaluation records
pub mod sample;

// Layer specifications and the network configuration
pub mod layer;

// Hyperparameters of a single training run
pub mod job;

// Core abstractions (traits) that other layers implement
pub mod traits;
