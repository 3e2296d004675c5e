//! CLI module for pumpsim.
//!
//! All command logic lives here so main.rs stays a thin shell and the
//! parsing and handlers can be tested directly.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{print_profile, run_cli, run_drill, validate_drill};
pub use output::{print_drill_summary, print_help, print_trace_table, print_version};

#[cfg(test)]
mod tests;
