use std::process::ExitCode;

use digit_classifier::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("digit_classifier=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(early) => {
            // --help / --version / usage
            if let Err(e) = early.print() {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
            return ExitCode::from(early.exit_code());
        }
    };

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
