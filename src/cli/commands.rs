//! CLI command handlers.

use std::path::Path;
use std::process::ExitCode;

use crate::drill::Drill;
use crate::error::PanelResult;
use crate::profile::Apparatus;

use super::output::{print_drill_summary, print_help, print_trace_table, print_version};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            drill_path,
            apparatus_path,
            json,
            verbose,
        } => run_drill(&drill_path, apparatus_path.as_deref(), json, verbose),
        Command::Validate { drill_path } => validate_drill(&drill_path),
        Command::Profile => print_profile(),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

fn load_apparatus(path: Option<&Path>) -> PanelResult<Apparatus> {
    path.map_or_else(|| Ok(Apparatus::standard_engine()), Apparatus::load)
}

/// Replay a drill file and print the result.
///
/// Exit code 1 on any load or tick error, or if a hose burst during the
/// drill.
#[must_use]
pub fn run_drill(path: &Path, apparatus_path: Option<&Path>, json: bool, verbose: bool) -> ExitCode {
    let result = Drill::load(path).and_then(|drill| {
        let apparatus = load_apparatus(apparatus_path)?;
        drill.run(&apparatus)
    });

    let trace = match result {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    if json {
        match trace.to_json(true) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        println!("╔═══════════════════════════════════════════════════════════════╗");
        println!("║               pumpsim - Pump Panel Drill                      ║");
        println!("╚═══════════════════════════════════════════════════════════════╝\n");
        println!("Drill: {} ({})\n", trace.name, path.display());
        if verbose {
            print_trace_table(&trace);
        }
        print_drill_summary(&trace);
    }

    if trace.summary.burst_lines.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Parse and check a drill file without running it.
#[must_use]
pub fn validate_drill(path: &Path) -> ExitCode {
    println!("Validating: {}\n", path.display());

    match Drill::load(path) {
        Ok(drill) => {
            println!("✓ Drill is valid");
            println!("  Name:     {}", drill.name);
            println!("  Tick:     {}s", drill.dt);
            println!("  Duration: {}s", drill.duration_secs);
            println!("  Actions:  {}", drill.actions.len());
            if drill.config.is_some() {
                println!("  Tuning:   overridden");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ Drill is invalid");
            println!("  {e}");
            ExitCode::from(1)
        }
    }
}

/// Print the built-in apparatus profile as YAML.
#[must_use]
pub fn print_profile() -> ExitCode {
    match Apparatus::standard_engine().to_yaml() {
        Ok(yaml) => {
            print!("{yaml}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
