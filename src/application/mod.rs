// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for each command. No tensor
// math and no file formats live here, only workflow:
//
//   dispatcher.rs        — Mode → the steps that mode needs
//   train_use_case.rs    — fit, snapshot, persist
//   evaluate_use_case.rs — arg-max over every test sample
//   classify_use_case.rs — one bitmap through the network
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

pub mod dispatcher;

// The training workflow
pub mod train_use_case;

pub mod evaluate_use_case;

pub mod classify_use_case;
