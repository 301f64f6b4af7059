// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and their positional arguments:
//
//   new          <output config> <epochs> <learning rate> [batch size]
//   train        <input config> <output config> <epochs> <learning rate> [batch size]
//   test         <input config>
//   test_on_file <input config> <input bitmap>
//
// Numbers are checked by clap value parsers, so a command that
// reaches Layer 2 is already valid: epochs and batch size are at
// least 1 and the learning rate is a finite positive number.
// The batch size may be left out (32). Extra trailing tokens are
// accepted and ignored.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::dispatcher::Mode;
use crate::domain::job::TrainingJob;

pub const USAGE: &str = "\
Usage: new          <output config> <epochs> <learning rate> [batch size]
     | train        <input config> <output config> <epochs> <learning rate> [batch size]
     | test         <input config>
     | test_on_file <input config> <input bitmap>";

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// The four top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the default architecture, train it, save it and evaluate it
    New(NewArgs),

    /// Continue training a saved model, save the result and evaluate it
    Train(TrainArgs),

    /// Evaluate a saved model on the test split
    Test(TestArgs),

    /// Classify a single bitmap with a saved model
    #[command(name = "test_on_file")]
    TestOnFile(TestOnFileArgs),
}

/// Hyperparameters shared by `new` and `train`, in command-line order.
#[derive(Args, Debug)]
pub struct Hyperparameters {
    /// Number of full passes over the training split
    #[arg(value_parser = parse_count)]
    pub epochs: usize,

    /// Adam step size
    #[arg(value_parser = parse_rate)]
    pub learning_rate: f64,

    /// Samples per gradient step
    #[arg(value_parser = parse_count, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Where the trained model is written
    pub output: PathBuf,

    #[command(flatten)]
    pub hyper: Hyperparameters,

    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Model file to continue from
    pub input: PathBuf,

    /// Where the trained model is written
    pub output: PathBuf,

    #[command(flatten)]
    pub hyper: Hyperparameters,

    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Model file to evaluate
    pub input: PathBuf,

    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

#[derive(Args, Debug)]
pub struct TestOnFileArgs {
    /// Model file to classify with
    pub input: PathBuf,

    /// Bitmap holding one handwritten digit
    pub image: PathBuf,

    #[arg(hide = true)]
    pub ignored: Vec<String>,
}

fn parse_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0)  => Err("must be at least 1".to_string()),
        Ok(n)  => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err("must be a finite number greater than 0".to_string())
    }
}

impl Hyperparameters {
    fn into_job(self, output_path: PathBuf) -> TrainingJob {
        TrainingJob {
            epochs:        self.epochs,
            learning_rate: self.learning_rate,
            batch_size:    self.batch_size,
            output_path,
        }
    }
}

/// Convert parsed arguments into the application-layer Mode.
/// The application layer never sees clap types.
impl From<Commands> for Mode {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::New(a)   => Mode::New { job: a.hyper.into_job(a.output) },
            Commands::Train(a) => Mode::Train { input: a.input, job: a.hyper.into_job(a.output) },
            Commands::Test(a)  => Mode::Test { input: a.input },
            Commands::TestOnFile(a) => Mode::TestOnFile { input: a.input, image: a.image },
        }
    }
}

// ─── Usage errors ─────────────────────────────────────────────────────────────
/// Any command line that does not parse. Nothing has been read or
/// written when this is returned.
#[derive(Debug, thiserror::Error)]
#[error("{detail}\n\n{usage}", usage = USAGE)]
pub struct UsageError {
    detail: String,
}

impl UsageError {
    pub fn exit_code(&self) -> u8 {
        1
    }
}

impl From<clap::Error> for UsageError {
    fn from(err: clap::Error) -> Self {
        let detail = err.render().to_string();
        let detail = detail.lines().next().unwrap_or_default().to_string();
        Self { detail }
    }
}
