// ============================================================
// Layer 5 — Burn Compute Engine
// ============================================================
// Adapts Network + run_training to the ComputeEngine trait the
// dispatcher depends on. The engine is generic over an autodiff
// backend; `ml::TrainBackend` is the one the CLI picks.

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;

use crate::domain::{job::TrainingJob, layer::ModelDocument, sample::TrainingSample, traits::ComputeEngine};
use crate::infra::settings::TrainingConfig;
use crate::ml::{model::Network, trainer::run_training};

pub struct BurnEngine<B: AutodiffBackend> {
    device:   B::Device,
    settings: TrainingConfig,
}

impl<B: AutodiffBackend> BurnEngine<B> {
    pub fn new(device: B::Device, settings: TrainingConfig) -> Self {
        Self { device, settings }
    }
}

impl<B: AutodiffBackend> ComputeEngine for BurnEngine<B> {
    type Model  = Network<B>;
    type Frozen = Network<B::InnerBackend>;

    fn build(&self, doc: &ModelDocument) -> Result<Self::Model> {
        tracing::debug!(
            "Building network with {} layers ({})",
            doc.layers.len(),
            if doc.is_trained() { "stored parameters" } else { "fresh parameters" },
        );
        Network::from_document(doc, self.settings.leaky_slope, self.device.clone())
            .context("Cannot build the network")
    }

    fn fit(&self, model: Self::Model, job: &TrainingJob, samples: Vec<TrainingSample>) -> Result<Self::Model> {
        run_training(model, job, samples, &self.settings)
    }

    fn snapshot(&self, model: &Self::Model) -> Result<ModelDocument> {
        model.document().context("Cannot read the trained parameters back")
    }

    fn freeze(&self, model: Self::Model) -> Result<Self::Frozen> {
        Ok(model.valid())
    }
}
