// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. `clap` parses the
// command line; Layer 2 does the work.
//
// Four commands are supported:
//   1. `new`          — train a fresh network from the default template
//   2. `train`        — continue training a saved network
//   3. `test`         — evaluate a saved network on the test split
//   4. `test_on_file` — classify one bitmap
//
// `run` is also where the concrete pieces are chosen: the IDX
// loader, the Burn engine, the coloured console reporter.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::application::dispatcher::{Dispatcher, Mode};
use crate::data::{loader::IdxLoader, preprocessor::BitmapPreprocessor};
use crate::infra::{report::ConsoleReporter, settings::HarnessConfig};
use crate::ml::{architecture::ArchitectureBuilder, engine::BurnEngine, TrainBackend};
use commands::{Commands, UsageError, USAGE};

#[derive(Parser, Debug)]
#[command(
    name = "digit-classifier",
    version,
    about = "Train, save and evaluate a convolutional digit classifier on MNIST.",
    override_usage = USAGE
)]
pub struct Cli {
    /// JSON settings file (dataset location, architecture, engine)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the four IDX files
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// What `parse_args` found instead of a runnable command.
#[derive(Debug)]
pub enum EarlyExit {
    /// `--help` or `--version`; print and exit 0.
    Info(clap::Error),
    Usage(UsageError),
}

impl EarlyExit {
    /// Write the help, version or usage text to stdout.
    pub fn print(&self) -> io::Result<()> {
        match self {
            EarlyExit::Info(info)   => info.print(),
            EarlyExit::Usage(usage) => writeln!(io::stdout(), "{usage}"),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            EarlyExit::Info(_)      => 0,
            EarlyExit::Usage(usage) => usage.exit_code(),
        }
    }
}

impl Cli {
    /// Parse `args`, separating help/version requests from usage errors.
    pub fn parse_args<I, T>(args: I) -> Result<Self, EarlyExit>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|err| match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EarlyExit::Info(err),
            _ => EarlyExit::Usage(UsageError::from(err)),
        })
    }

    /// Load settings, wire the concrete components, and run the command.
    pub fn run(self) -> Result<()> {
        let settings = HarnessConfig::load(self.config.as_deref())?.with_data_dir(self.data_dir);
        tracing::debug!("Settings: {:?}", settings);

        let engine       = BurnEngine::<TrainBackend>::new(Default::default(), settings.training.clone());
        let source       = IdxLoader::new(settings.dataset.clone());
        let builder      = ArchitectureBuilder::from_settings(&settings);
        let preprocessor = BitmapPreprocessor::new(&settings.preprocess, settings.dataset.rows, settings.dataset.cols)?;
        let reporter     = ConsoleReporter::stdout();

        let mut dispatcher = Dispatcher::new(engine, source, builder, preprocessor, reporter, std::io::stdout());
        let outcome = dispatcher.run(Mode::from(self.command))?;
        tracing::debug!("Finished with {:?}", outcome);
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::TrainingJob;

    fn parse(args: &[&str]) -> Result<Cli, EarlyExit> {
        Cli::parse_args(std::iter::once("digit-classifier").chain(args.iter().copied()))
    }

    fn mode(args: &[&str]) -> Mode {
        match parse(args) {
            Ok(cli) => Mode::from(cli.command),
            Err(e)  => panic!("{args:?} did not parse: {e:?}"),
        }
    }

    fn usage_code(args: &[&str]) -> u8 {
        match parse(args) {
            Err(EarlyExit::Usage(e)) => e.exit_code(),
            other => panic!("{args:?} should be a usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_parses_all_four_arguments() {
        assert_eq!(mode(&["new", "out.json", "5", "0.01", "32"]), Mode::New {
            job: TrainingJob { epochs: 5, learning_rate: 0.01, batch_size: 32, output_path: "out.json".into() },
        });
    }

    #[test]
    fn test_batch_size_may_be_left_out() {
        assert_eq!(mode(&["new", "out.json", "5", "0.01"]), Mode::New {
            job: TrainingJob { epochs: 5, learning_rate: 0.01, batch_size: 32, output_path: "out.json".into() },
        });
    }

    #[test]
    fn test_train_parses_all_five_arguments() {
        assert_eq!(mode(&["train", "in.json", "out.json", "3", "0.001", "16"]), Mode::Train {
            input: "in.json".into(),
            job:   TrainingJob { epochs: 3, learning_rate: 0.001, batch_size: 16, output_path: "out.json".into() },
        });
    }

    #[test]
    fn test_test_modes_parse() {
        assert_eq!(mode(&["test", "m.json"]), Mode::Test { input: "m.json".into() });
        assert_eq!(mode(&["test_on_file", "m.json", "digit.bmp"]), Mode::TestOnFile {
            input: "m.json".into(),
            image: "digit.bmp".into(),
        });
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        assert_eq!(mode(&["test", "m.json", "extra", "tokens"]), Mode::Test { input: "m.json".into() });
    }

    #[test]
    fn test_too_few_arguments_is_a_usage_error() {
        assert_eq!(usage_code(&["new", "out.json", "5"]), 1);
        assert_eq!(usage_code(&["train", "in.json", "out.json", "5"]), 1);
        assert_eq!(usage_code(&["test_on_file", "m.json"]), 1);
        assert_eq!(usage_code(&[]), 1);
    }

    #[test]
    fn test_bad_numbers_are_usage_errors() {
        assert_eq!(usage_code(&["new", "out.json", "five", "0.01", "32"]), 1);
        assert_eq!(usage_code(&["new", "out.json", "0", "0.01", "32"]), 1);
        assert_eq!(usage_code(&["new", "out.json", "5", "-0.1", "32"]), 1);
        assert_eq!(usage_code(&["new", "out.json", "5", "NaN", "32"]), 1);
        assert_eq!(usage_code(&["train", "in.json", "out.json", "5", "0.01", "0"]), 1);
        assert_eq!(usage_code(&["fit", "m.json"]), 1);
    }

    #[test]
    fn test_usage_error_carries_the_usage_text() {
        let Err(EarlyExit::Usage(err)) = parse(&["new", "out.json", "5"]) else {
            panic!("expected a usage error");
        };
        assert!(err.to_string().contains("test_on_file <input config> <input bitmap>"));
    }

    #[test]
    fn test_help_is_not_a_usage_error() {
        assert!(matches!(parse(&["--help"]), Err(EarlyExit::Info(_))));
        assert!(matches!(parse(&["--version"]), Err(EarlyExit::Info(_))));
    }

    #[test]
    fn test_early_exit_codes() {
        let code = |args: &[&str]| match parse(args) {
            Err(early) => early.exit_code(),
            Ok(_)      => panic!("{args:?} should not produce a runnable command"),
        };
        assert_eq!(code(&["--help"]), 0);
        assert_eq!(code(&["--version"]), 0);
        assert_eq!(code(&["new", "out.json"]), 1);
    }

    #[test]
    fn test_early_exit_text_is_written() {
        let Err(early) = parse(&["--version"]) else {
            panic!("expected version output");
        };
        assert!(early.print().is_ok());
    }

    #[test]
    fn test_global_options() {
        let cli = parse(&["test", "m.json", "--data-dir", "/data/mnist", "--config", "cfg.json"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/data/mnist")));
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
    }
}
