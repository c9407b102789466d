//! Command-line entry point for the `emu8060` emulator binary.

use clap::Parser;
use ins8060_core as _;
use ins8060_host::cli::Cli;
use ins8060_host::{Session, SessionOutcome};
use log as _;
#[cfg(test)]
use rstest as _;
use simple_logger::SimpleLogger;
#[cfg(test)]
use tempfile as _;
use thiserror as _;

fn main() {
    if std::env::args_os().len() <= 1 {
        eprintln!("{}", Cli::usage());
        return;
    }

    let cli = Cli::parse();
    if let Err(error) = SimpleLogger::new().with_level(cli.log_level()).init() {
        eprintln!("warning: logging disabled: {error}");
    }

    let exit_code = match Session::prepare(cli.session_config()).and_then(Session::run) {
        Ok(outcome) => {
            if let SessionOutcome::TraceDumped { path } = &outcome {
                eprintln!("execution stopped; trace written to {}", path.display());
            }
            outcome.exit_code()
        }
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    };

    std::process::exit(exit_code);
}
