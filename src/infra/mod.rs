// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns shared by the other layers:
//
//   settings.rs    — HarnessConfig: dataset paths and sizes,
//                    preprocessing window, architecture
//                    template and engine knobs, loaded from
//                    an optional JSON file
//
//   model_store.rs — JSON persistence of a model: one tagged
//                    object per layer, decoded through a
//                    fixed table of layer decoders
//
//   report.rs      — coloured per-sample evaluation lines and
//                    the accuracy summary
//
//   metrics.rs     — per-epoch training metrics, optionally
//                    appended to a CSV file
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

pub mod settings;

/// Model document encoding, decoding and file I/O
pub mod model_store;

pub mod report;

/// Training metrics CSV logger
pub mod metrics;
