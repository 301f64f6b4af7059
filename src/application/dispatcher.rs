// ============================================================
// Layer 2 — Command Dispatcher
// ============================================================
// Executes one validated Mode:
//
//   Mode          Model from            Dataset      Then
//   ──────────    ───────────────────   ──────────   ─────────────────────────
//   New           ArchitectureBuilder   train+test   train → persist → evaluate
//   Train         model file            train+test   train → persist → evaluate
//   Test          model file            test only    evaluate
//   TestOnFile    model file            none         classify one bitmap
//
// Splits a mode does not need are never read. The model file is
// read before any dataset, and evaluation and classification run
// on the engine's frozen model. Progress lines go to `out`;
// per-sample results go through the reporter.

use anyhow::Result;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

use crate::application::{
    classify_use_case::ClassifyUseCase,
    evaluate_use_case::Evaluator,
    train_use_case::TrainUseCase,
};
use crate::data::preprocessor::BitmapPreprocessor;
use crate::domain::{
    job::TrainingJob,
    layer::ModelDocument,
    sample::{Accuracy, EvaluationSample, TrainingSample},
    traits::{ComputeEngine, EvaluationReporter, LoadRequest, LoadedSplits, SampleSource},
};
use crate::infra::model_store::ModelStore;
use crate::ml::architecture::ArchitectureBuilder;

/// A fully validated command.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    New        { job: TrainingJob },
    Train      { input: PathBuf, job: TrainingJob },
    Test       { input: PathBuf },
    TestOnFile { input: PathBuf, image: PathBuf },
}

impl Mode {
    /// Dataset splits this mode reads, if any.
    pub fn load_request(&self) -> Option<LoadRequest> {
        match self {
            Mode::New { .. } | Mode::Train { .. } => Some(LoadRequest::both()),
            Mode::Test { .. }                     => Some(LoadRequest::testing_only()),
            Mode::TestOnFile { .. }               => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Evaluated(Accuracy),
    Classified(usize),
}

pub struct Dispatcher<E, S, R, W> {
    engine:       E,
    source:       S,
    builder:      ArchitectureBuilder,
    preprocessor: BitmapPreprocessor,
    reporter:     R,
    out:          W,
}

impl<E, S, R, W> Dispatcher<E, S, R, W>
where
    E: ComputeEngine,
    S: SampleSource,
    R: EvaluationReporter,
    W: Write,
{
    pub fn new(
        engine:       E,
        source:       S,
        builder:      ArchitectureBuilder,
        preprocessor: BitmapPreprocessor,
        reporter:     R,
        out:          W,
    ) -> Self {
        Self { engine, source, builder, preprocessor, reporter, out }
    }

    pub fn run(&mut self, mode: Mode) -> Result<Outcome> {
        tracing::debug!("Dispatching {:?}", mode);

        // ── Step 1: Model document ────────────────────────────────────────────
        let doc = match &mode {
            Mode::New { .. }                                 => ModelDocument::untrained(self.builder.build()),
            Mode::Train { input, .. } | Mode::Test { input } => self.import(input)?,
            Mode::TestOnFile { input, .. }                   => ModelStore::load(input)?,
        };

        // ── Step 2: Dataset splits ────────────────────────────────────────────
        let splits = match mode.load_request() {
            Some(request) => self.source.load(request)?,
            None          => LoadedSplits::default(),
        };

        // ── Step 3: Act ───────────────────────────────────────────────────────
        let model = self.engine.build(&doc)?;
        match mode {
            Mode::New { job } | Mode::Train { job, .. } => {
                let model = self.train(model, &job, splits.training)?;
                self.evaluate(model, &splits.testing)
            }
            Mode::Test { .. } => self.evaluate(model, &splits.testing),
            Mode::TestOnFile { image, .. } => {
                let model = self.engine.freeze(model)?;
                let digit = ClassifyUseCase::new(&self.preprocessor).execute(&model, &image)?;
                writeln!(self.out, "Network sees this as a '{digit}'")?;
                Ok(Outcome::Classified(digit))
            }
        }
    }

    fn import(&mut self, input: &Path) -> Result<ModelDocument> {
        writeln!(self.out, "Importing network data from {}", input.display())?;
        ModelStore::load(input)
    }

    fn train(&mut self, model: E::Model, job: &TrainingJob, samples: Vec<TrainingSample>) -> Result<E::Model> {
        TrainUseCase::new(&self.engine).execute(model, job, samples, &mut self.out)
    }

    fn evaluate(&mut self, model: E::Model, samples: &[EvaluationSample]) -> Result<Outcome> {
        let model = self.engine.freeze(model)?;
        self.out.flush()?;
        let accuracy = Evaluator::evaluate(&model, samples, &mut self.reporter)?;
        Ok(Outcome::Evaluated(accuracy))
    }
}
