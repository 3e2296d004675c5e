//! pumpsim CLI - fire apparatus pump panel simulator
//!
//! Thin shell over [`pumpsim::cli`]: installs the log subscriber and
//! dispatches.

use std::process::ExitCode;

use pumpsim::cli::{run_cli, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose() { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run_cli(args)
}
