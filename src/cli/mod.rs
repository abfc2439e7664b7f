//! Command-line interface layer.

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod commands;
pub mod exit_status;
pub mod report;
mod run;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    init_tracing(args.debug());

    let verbose = args.verbose();
    let quiet = args.quiet();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let result = run::run(args)?;
    report::print(&result, verbose, quiet);

    Ok(ExitStatus::from_result(&result).into())
}

/// Install the stderr tracing subscriber.
///
/// `--debug` forces the `debug` level; otherwise `RUST_LOG` is honoured, and
/// without it nothing is logged.
pub fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
