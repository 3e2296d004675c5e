//! CLI argument parsing.
//!
//! Hand-rolled so parsing can be driven from tests with any iterator of
//! strings.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replay a drill
    Run {
        /// Path to the drill YAML file.
        drill_path: PathBuf,
        /// Apparatus profile to use instead of the built-in engine.
        apparatus_path: Option<PathBuf>,
        /// Print the full trace as JSON.
        json: bool,
        /// Enable verbose output.
        verbose: bool,
    },
    /// Check a drill file without running it
    Validate {
        /// Path to the drill YAML file.
        drill_path: PathBuf,
    },
    /// Print the built-in apparatus profile as YAML
    Profile,
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(args),
            "validate" => Self::parse_validate_command(args),
            "profile" => Command::Profile,
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    fn parse_run_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'run' command requires a drill path");
            return Command::Help;
        }

        let mut apparatus_path = None;
        let mut json = false;
        let mut verbose = false;

        let mut i = 3;
        while i < args.len() {
            match args[i].as_str() {
                "--apparatus" => {
                    if let Some(path) = args.get(i + 1) {
                        apparatus_path = Some(PathBuf::from(path));
                        i += 2;
                    } else {
                        eprintln!("Error: '--apparatus' requires a file path");
                        i += 1;
                    }
                }
                "--json" => {
                    json = true;
                    i += 1;
                }
                "-v" | "--verbose" => {
                    verbose = true;
                    i += 1;
                }
                other => {
                    eprintln!("Ignoring unknown option: {other}");
                    i += 1;
                }
            }
        }

        Command::Run {
            drill_path: PathBuf::from(&args[2]),
            apparatus_path,
            json,
            verbose,
        }
    }

    fn parse_validate_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'validate' command requires a drill path");
            return Command::Help;
        }

        Command::Validate {
            drill_path: PathBuf::from(&args[2]),
        }
    }

    /// Whether the command asked for verbose logging.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        matches!(self.command, Command::Run { verbose: true, .. })
    }
}
