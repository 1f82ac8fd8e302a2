//! SHOGI.ORACLE CLI
//!
//! Captures traces from recorded engine runs, compares two traces and prints
//! traces with move notation.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "oracle=info";

#[derive(Parser)]
#[command(name = "oracle")]
#[command(
    about = "SHOGI.ORACLE - trace capture and verification for the reference shogi engine",
    long_about = None
)]
struct Cli {
    /// Log filter, e.g. `oracle_capture=debug`; overrides RUST_LOG
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a trace from a recorded run
    Capture {
        /// Recording to replay (JSON)
        #[arg(short, long)]
        recording: PathBuf,
        /// Capture config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Trace file, overrides the config
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Append a timestamp to the trace file name
        #[arg(long)]
        stamp: bool,
        /// Omit the layout header
        #[arg(long)]
        no_header: bool,
    },
    /// Compare two traces; exits 1 if they diverge
    Diff {
        /// Expected trace
        #[arg(long)]
        left: PathBuf,
        /// Actual trace
        #[arg(long)]
        right: PathBuf,
    },
    /// Print a trace with move notation
    Inspect {
        /// Trace file
        #[arg(short, long)]
        log: PathBuf,
    },
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.log_filter.as_deref());

    match cli.command {
        Commands::Capture {
            recording,
            config,
            output,
            stamp,
            no_header,
        } => commands::capture(&commands::CaptureArgs {
            recording,
            config,
            output,
            stamp,
            no_header,
        }),
        Commands::Diff { left, right } => commands::diff(&left, &right),
        Commands::Inspect { log } => commands::inspect(&log),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capture() {
        let cli = Cli::try_parse_from([
            "oracle",
            "capture",
            "--recording",
            "run.json",
            "-o",
            "out.log",
            "--stamp",
        ])
        .unwrap();
        match cli.command {
            Commands::Capture {
                recording,
                output,
                stamp,
                no_header,
                config,
            } => {
                assert_eq!(recording, PathBuf::from("run.json"));
                assert_eq!(output, Some(PathBuf::from("out.log")));
                assert!(stamp);
                assert!(!no_header);
                assert!(config.is_none());
            }
            _ => panic!("expected capture"),
        }
    }

    #[test]
    fn test_parse_diff_with_log_filter() {
        let cli = Cli::try_parse_from([
            "oracle",
            "diff",
            "--left",
            "a.log",
            "--right",
            "b.log",
            "--log-filter",
            "oracle=debug",
        ])
        .unwrap();
        assert_eq!(cli.log_filter.as_deref(), Some("oracle=debug"));
        assert!(matches!(cli.command, Commands::Diff { .. }));
    }

    #[test]
    fn test_diff_requires_both_sides() {
        assert!(Cli::try_parse_from(["oracle", "diff", "--left", "a.log"]).is_err());
    }
}
