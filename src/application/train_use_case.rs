// ============================================================
// Layer 2 — Train Use Case
// ============================================================
// Orchestrates one training run in order:
//
//   Step 1: Fit the model on the training split  (Layer 5 - ml)
//   Step 2: Read the learned parameters back     (Layer 5 - ml)
//   Step 3: Write the model document to disk     (Layer 6 - infra)
//
// The caller decides where the starting model comes from
// (a fresh architecture for `new`, a stored file for `train`).

use anyhow::Result;
use std::io::Write;

use crate::domain::{job::TrainingJob, sample::TrainingSample, traits::ComputeEngine};
use crate::infra::model_store::ModelStore;

pub struct TrainUseCase<'a, E: ComputeEngine> {
    engine: &'a E,
}

impl<'a, E: ComputeEngine> TrainUseCase<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Train, persist to `job.output_path`, and return the trained model.
    pub fn execute<W: Write>(
        &self,
        model:   E::Model,
        job:     &TrainingJob,
        samples: Vec<TrainingSample>,
        out:     &mut W,
    ) -> Result<E::Model> {
        writeln!(
            out,
            "Training for {} epochs with batch size {} and learning rate {}",
            job.epochs, job.batch_size, job.learning_rate,
        )?;

        // ── Step 1: Fit ───────────────────────────────────────────────────────
        let model = self.engine.fit(model, job, samples)?;
        writeln!(out, "Training finished")?;

        // ── Step 2–3: Snapshot and persist ────────────────────────────────────
        let doc = self.engine.snapshot(&model)?;
        ModelStore::save(&job.output_path, &doc)?;
        writeln!(out, "Network data serialized to {}", job.output_path.display())?;

        Ok(model)
    }
}
