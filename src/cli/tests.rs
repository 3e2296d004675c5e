//! CLI module tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::args::{Args, Command};
use super::commands::{print_profile, run_cli, run_drill, validate_drill};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

// ============================================================================
// Args parsing tests
// ============================================================================

#[test]
fn test_parse_no_args_shows_help() {
    let args = Args::parse_from(["pumpsim"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_help_variants() {
    for flag in ["-h", "--help", "help"] {
        assert_eq!(Args::parse_from(["pumpsim", flag]).command, Command::Help);
    }
}

#[test]
fn test_parse_version_variants() {
    for flag in ["-V", "--version", "version"] {
        assert_eq!(Args::parse_from(["pumpsim", flag]).command, Command::Version);
    }
}

#[test]
fn test_parse_unknown_command() {
    let args = Args::parse_from(["pumpsim", "pump-it"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_run_command() {
    let args = Args::parse_from(["pumpsim", "run", "drill.yaml"]);
    assert_eq!(
        args.command,
        Command::Run {
            drill_path: PathBuf::from("drill.yaml"),
            apparatus_path: None,
            json: false,
            verbose: false,
        }
    );
    assert!(!args.verbose());
}

#[test]
fn test_parse_run_with_options() {
    let args = Args::parse_from([
        "pumpsim",
        "run",
        "drill.yaml",
        "--json",
        "--apparatus",
        "quint.yaml",
        "-v",
    ]);
    assert_eq!(
        args.command,
        Command::Run {
            drill_path: PathBuf::from("drill.yaml"),
            apparatus_path: Some(PathBuf::from("quint.yaml")),
            json: true,
            verbose: true,
        }
    );
    assert!(args.verbose());
}

#[test]
fn test_parse_run_apparatus_missing_value() {
    let args = Args::parse_from(["pumpsim", "run", "drill.yaml", "--apparatus"]);
    match args.command {
        Command::Run { apparatus_path, .. } => assert!(apparatus_path.is_none()),
        other => panic!("expected Run, got {other:?}"),
    }
}

#[test]
fn test_parse_run_missing_path() {
    let args = Args::parse_from(["pumpsim", "run"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_validate() {
    let args = Args::parse_from(["pumpsim", "validate", "drill.yaml"]);
    assert_eq!(
        args.command,
        Command::Validate {
            drill_path: PathBuf::from("drill.yaml")
        }
    );
    assert_eq!(Args::parse_from(["pumpsim", "validate"]).command, Command::Help);
}

#[test]
fn test_parse_profile() {
    assert_eq!(Args::parse_from(["pumpsim", "profile"]).command, Command::Profile);
}

// ============================================================================
// Command tests
// ============================================================================

fn write_drill(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const QUIET_DRILL: &str = "name: Quiet\ndt: 0.5\nduration_secs: 2\nactions:\n  - at: 0\n    action: engage_pump\n";

#[test]
fn test_help_and_version_succeed() {
    assert_eq!(run_cli(Args::parse_from(["pumpsim"])), ExitCode::SUCCESS);
    assert_eq!(run_cli(Args::parse_from(["pumpsim", "version"])), ExitCode::SUCCESS);
}

#[test]
fn test_profile_succeeds() {
    assert_eq!(print_profile(), ExitCode::SUCCESS);
}

#[test]
fn test_validate_good_drill() {
    let file = write_drill(QUIET_DRILL);
    assert_eq!(validate_drill(file.path()), ExitCode::SUCCESS);
}

#[test]
fn test_validate_bad_drill() {
    let file = write_drill("name: Bad\ndt: -1\nduration_secs: 2\n");
    assert_eq!(validate_drill(file.path()), ExitCode::from(1));
}

#[test]
fn test_validate_missing_file() {
    assert_eq!(
        validate_drill(&PathBuf::from("/nonexistent/drill.yaml")),
        ExitCode::from(1)
    );
}

#[test]
fn test_run_quiet_drill() {
    let file = write_drill(QUIET_DRILL);
    assert_eq!(run_drill(file.path(), None, false, true), ExitCode::SUCCESS);
    assert_eq!(run_drill(file.path(), None, true, false), ExitCode::SUCCESS);
}

#[test]
fn test_run_with_bad_apparatus_fails() {
    let drill = write_drill(QUIET_DRILL);
    let apparatus = write_drill("name: Broken\nlines: {}\n");
    assert_eq!(
        run_drill(drill.path(), Some(apparatus.path()), false, false),
        ExitCode::from(1)
    );
}
