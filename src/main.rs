//! Delivery moving average — CLI entrypoint.
//! Reads a JSON-lines event log and prints one moving-average record per
//! minute to stdout. Logs go to stderr.

use clap::Parser;
use delivery_moving_average::{run, Config};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Calculate the moving average delivery time per minute.",
    long_about = None
)]
struct Cli {
    /// Path to the JSON-lines event log
    #[arg(long = "input_file")]
    input_file: String,

    /// Window size in minutes for the moving average
    #[arg(long = "window_size", value_parser = clap::value_parser!(u32).range(1..))]
    window_size: u32,

    /// Fail on events whose timestamp goes backwards instead of trusting
    /// the input order
    #[arg(long)]
    strict: bool,
}

/// Compact logs on stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::new(cli.input_file, cli.window_size, cli.strict);

    let stdout = io::stdout();
    match run(&config, stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
