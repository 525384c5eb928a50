//! # Reporter
//! Serializes minute averages as JSON lines:
//! `{"date": "2018-12-26 18:11:00", "average_delivery_time": 0}`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io::{self, Write};

use crate::event::MINUTE_FORMAT;
use crate::rolling::MinuteAverage;

/// Average as it appears in the report: integer `0` for a minute with no
/// active events, a float otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportedAverage {
    Empty(u8),
    Mean(f64),
}

impl From<&MinuteAverage> for ReportedAverage {
    fn from(m: &MinuteAverage) -> Self {
        if m.active_events == 0 {
            ReportedAverage::Empty(0)
        } else {
            ReportedAverage::Mean(m.average)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinuteReport {
    pub date: String,
    pub average_delivery_time: ReportedAverage,
}

impl From<&MinuteAverage> for MinuteReport {
    fn from(m: &MinuteAverage) -> Self {
        Self {
            date: m.minute.format(MINUTE_FORMAT).to_string(),
            average_delivery_time: m.into(),
        }
    }
}

/// Compact layout with `", "` between members and `": "` after keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Write one JSON object per line, ascending by minute. Returns lines written.
pub fn write_json_lines<W: Write>(mut out: W, results: &[MinuteAverage]) -> Result<usize> {
    let mut sorted: Vec<&MinuteAverage> = results.iter().collect();
    sorted.sort_by_key(|m| m.minute);

    for m in &sorted {
        let mut ser = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
        MinuteReport::from(*m)
            .serialize(&mut ser)
            .context("encode report line")?;
        out.write_all(b"\n").context("write report line")?;
    }
    out.flush().context("flush report")?;
    Ok(sorted.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn minute(m: u32, average: f64, active_events: usize) -> MinuteAverage {
        MinuteAverage {
            minute: NaiveDate::from_ymd_opt(2018, 12, 26)
                .unwrap()
                .and_hms_opt(18, m, 0)
                .unwrap(),
            average,
            active_events,
        }
    }

    #[test]
    fn empty_minute_is_integer_zero() {
        let mut buf = Vec::new();
        write_json_lines(&mut buf, &[minute(11, 0.0, 0), minute(12, 20.0, 1)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            concat!(
                r#"{"date": "2018-12-26 18:11:00", "average_delivery_time": 0}"#,
                "\n",
                r#"{"date": "2018-12-26 18:12:00", "average_delivery_time": 20.0}"#,
                "\n",
            )
        );
    }

    #[test]
    fn lines_come_out_sorted() {
        let mut buf = Vec::new();
        let n = write_json_lines(&mut buf, &[minute(13, 2.5, 2), minute(12, 1.0, 1)]).unwrap();
        assert_eq!(n, 2);
        let text = String::from_utf8(buf).unwrap();
        let first = text.lines().next().unwrap();
        assert!(first.contains("18:12:00"), "{text}");
    }
}
