#![forbid(unsafe_code)]

use clap::Parser;
use scry_commands::builtin_registry;
use scry_core::{ExitCode, MemImage};
use scry_pipeline::{execute_line, ExecContext};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const BIN_NAME: &str = "scry";

#[derive(Debug, Parser)]
#[command(
    name = BIN_NAME,
    version,
    about = "Inspect typed objects in an image snapshot through command pipelines"
)]
struct Cli {
    /// JSON image snapshot to open
    #[arg(long, value_name = "FILE")]
    image: PathBuf,

    /// Evaluate one pipeline and exit instead of reading stdin
    #[arg(short = 'e', long = "eval", value_name = "PIPELINE")]
    eval: Option<String>,

    /// Only log errors
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);
    ProcessExitCode::from(run(&cli) as u8)
}

fn init_tracing(cli: &Cli) {
    let fallback = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> ExitCode {
    let raw = match std::fs::read_to_string(&cli.image) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("{BIN_NAME}: cannot read image {}: {e}", cli.image.display());
            return ExitCode::DependencyFailure;
        }
    };
    let image = match MemImage::from_json(&raw) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("{BIN_NAME}: {e}");
            return ExitCode::DependencyFailure;
        }
    };
    let registry = match builtin_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{BIN_NAME}: {e}");
            return ExitCode::Internal;
        }
    };
    let ctx = ExecContext {
        image: &image,
        registry: &registry,
    };
    let stdout = io::stdout();

    if let Some(line) = &cli.eval {
        return match execute_line(&ctx, line, &mut stdout.lock()) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("{e}");
                e.exit_code()
            }
        };
    }

    // Line-at-a-time loop: report each failure and keep reading.
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("{BIN_NAME}: stdin: {e}");
                return ExitCode::DependencyFailure;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        debug!(line = line.as_str(), "evaluating");
        if let Err(e) = execute_line(&ctx, &line, &mut stdout.lock()) {
            eprintln!("{e}");
        }
    }
    ExitCode::Success
}
