// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod event;
pub mod ingest;
pub mod report;
pub mod rolling;

// ---- Re-exports for stable public API ----
pub use crate::config::Config;
pub use crate::event::DeliveryEvent;
pub use crate::rolling::{moving_averages, AggregateError, InputOrder, MinuteAverage};

use anyhow::{Context, Result};
use std::io::Write;
use tracing::{info, warn};

/// Load the event log named by `config`, aggregate it, and write the report
/// to `out`. Returns the number of report lines written.
pub fn run<W: Write>(config: &Config, out: W) -> Result<usize> {
    config.validate()?;

    let events = ingest::load_events_from(&config.input_file)?;
    if events.is_empty() {
        warn!(path = %config.input_file.display(), "event log is empty; nothing to report");
    }
    let n_events = events.len();

    let results = moving_averages(events, config.window_size, config.input_order)
        .with_context(|| format!("aggregating {}", config.input_file.display()))?;

    let written = report::write_json_lines(out, &results)?;
    info!(
        events = n_events,
        minutes = written,
        window_size = config.window_size,
        order = ?config.input_order,
        "moving average report written"
    );
    Ok(written)
}
