// src/ingest.rs
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::event::DeliveryEvent;

/// Load events from a JSON-lines file, one record per line.
pub fn load_events_from(path: &Path) -> Result<Vec<DeliveryEvent>> {
    let file =
        File::open(path).with_context(|| format!("opening event log {}", path.display()))?;
    let events = load_events_from_reader(BufReader::new(file))
        .with_context(|| format!("reading event log {}", path.display()))?;
    tracing::info!(path = %path.display(), events = events.len(), "loaded event log");
    Ok(events)
}

/// Parse JSON-lines records from any buffered reader. Blank lines are skipped;
/// any other unparsable line is an error naming its 1-based line number.
pub fn load_events_from_reader<R: BufRead>(reader: R) -> Result<Vec<DeliveryEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("line {line_no}: read failed"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            tracing::trace!(line_no, "skipping blank line");
            continue;
        }
        let ev: DeliveryEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("line {line_no}: invalid event record"))?;
        events.push(ev);
    }
    Ok(events)
}
