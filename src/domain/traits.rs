// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The dispatcher only ever talks to these traits:
//
//   SampleSource       → IdxLoader reads the IDX files
//   Classifier         → anything with forward(matrix) -> matrix
//   ComputeEngine      → BurnEngine builds, trains and snapshots
//   EvaluationReporter → ConsoleReporter prints coloured lines
//
// Tests swap in small fakes for each of them, which is how the
// dispatcher is exercised without a dataset or a GPU.

use anyhow::Result;

use crate::domain::{
    job::TrainingJob,
    layer::ModelDocument,
    sample::{Accuracy, EvaluationRecord, EvaluationSample, TrainingSample},
    tensor::Matrix,
};

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Which splits a mode needs. Splits that are not requested are never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadRequest {
    pub training: bool,
    pub testing:  bool,
}

impl LoadRequest {
    pub fn both() -> Self { Self { training: true, testing: true } }

    pub fn testing_only() -> Self { Self { training: false, testing: true } }
}

/// Samples produced for a LoadRequest. Unrequested splits are empty.
#[derive(Debug, Clone, Default)]
pub struct LoadedSplits {
    pub training: Vec<TrainingSample>,
    pub testing:  Vec<EvaluationSample>,
}

pub trait SampleSource {
    fn load(&self, request: LoadRequest) -> Result<LoadedSplits>;
}

impl<S: SampleSource + ?Sized> SampleSource for &S {
    fn load(&self, request: LoadRequest) -> Result<LoadedSplits> {
        (**self).load(request)
    }
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A trained network seen from the outside: one row in, one row out.
pub trait Classifier {
    fn forward(&self, input: &Matrix) -> Result<Matrix>;
}

// ─── ComputeEngine ────────────────────────────────────────────────────────────
/// The numerical engine. Owns weight initialisation, the forward pass,
/// the optimiser and the training loop.
pub trait ComputeEngine {
    /// The trainable model.
    type Model;

    /// The same network with training bookkeeping stripped, used for
    /// evaluation and single-image inference.
    type Frozen: Classifier;

    /// Instantiate a model for `doc`. Layers without stored parameters
    /// get freshly initialised ones.
    fn build(&self, doc: &ModelDocument) -> Result<Self::Model>;

    /// Train `model` on `samples` and hand back the trained state.
    fn fit(
        &self,
        model:   Self::Model,
        job:     &TrainingJob,
        samples: Vec<TrainingSample>,
    ) -> Result<Self::Model>;

    /// Architecture plus current learned parameters, ready to persist.
    fn snapshot(&self, model: &Self::Model) -> Result<ModelDocument>;

    /// Convert a trainable model into its inference form.
    fn freeze(&self, model: Self::Model) -> Result<Self::Frozen>;
}

impl<E: ComputeEngine + ?Sized> ComputeEngine for &E {
    type Model  = E::Model;
    type Frozen = E::Frozen;

    fn build(&self, doc: &ModelDocument) -> Result<Self::Model> {
        (**self).build(doc)
    }

    fn fit(&self, model: Self::Model, job: &TrainingJob, samples: Vec<TrainingSample>) -> Result<Self::Model> {
        (**self).fit(model, job, samples)
    }

    fn snapshot(&self, model: &Self::Model) -> Result<ModelDocument> {
        (**self).snapshot(model)
    }

    fn freeze(&self, model: Self::Model) -> Result<Self::Frozen> {
        (**self).freeze(model)
    }
}

// ─── EvaluationReporter ───────────────────────────────────────────────────────
/// Presentation of evaluation results. The evaluator only hands over
/// plain records; colours and formatting stay behind this trait.
pub trait EvaluationReporter {
    fn record(&mut self, record: &EvaluationRecord) -> Result<()>;

    fn summary(&mut self, accuracy: &Accuracy) -> Result<()>;
}

impl<R: EvaluationReporter + ?Sized> EvaluationReporter for &mut R {
    fn record(&mut self, record: &EvaluationRecord) -> Result<()> {
        (**self).record(record)
    }

    fn summary(&mut self, accuracy: &Accuracy) -> Result<()> {
        (**self).summary(accuracy)
    }
}
