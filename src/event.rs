//! # Delivery Events
//! A delivery event is a `(timestamp, duration)` pair read from the event log.
//! Records may carry any number of other fields; only these two are kept.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input timestamp layout, e.g. `2018-12-26 18:11:08.509654`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Output layout for minute boundaries, e.g. `2018-12-26 18:11:00`.
pub const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    /// Unit-agnostic (the event log uses seconds).
    pub duration: f64,
}

impl DeliveryEvent {
    pub fn new(timestamp: NaiveDateTime, duration: f64) -> Self {
        Self {
            timestamp,
            duration,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TimestampError {
    #[error(transparent)]
    Parse(#[from] chrono::ParseError),
    #[error("seconds must be in 00..=59")]
    LeapSecond,
}

/// Parse a log timestamp. The fractional part may have 1–9 digits.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, TimestampError> {
    let ts = NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)?;
    // chrono folds `:60` into the nanosecond field
    if ts.nanosecond() >= 1_000_000_000 {
        return Err(TimestampError::LeapSecond);
    }
    Ok(ts)
}

/// Zero the seconds and sub-seconds of `ts`.
pub fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts - Duration::seconds(i64::from(ts.second()))
        - Duration::nanoseconds(i64::from(ts.nanosecond()))
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format("%Y-%m-%d %H:%M:%S%.6f"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 12, 26)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    #[test]
    fn parses_microsecond_timestamps() {
        let ts = parse_timestamp("2018-12-26 18:11:08.509654").unwrap();
        assert_eq!(ts, at(18, 11, 8, 509_654));
    }

    #[test]
    fn rejects_other_layouts() {
        assert!(parse_timestamp("2018-12-26T18:11:08.509654").is_err());
        assert!(parse_timestamp("26/12/2018 18:11:08").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn rejects_leap_second() {
        assert_eq!(
            parse_timestamp("2018-12-26 18:11:60.5"),
            Err(TimestampError::LeapSecond)
        );
        assert!(parse_timestamp("2018-12-26 18:11:59.999999").is_ok());
    }

    #[test]
    fn truncation_zeroes_seconds_and_fraction() {
        assert_eq!(truncate_to_minute(at(18, 11, 8, 509_654)), at(18, 11, 0, 0));
        assert_eq!(truncate_to_minute(at(18, 11, 0, 0)), at(18, 11, 0, 0));
        assert_eq!(truncate_to_minute(at(23, 59, 59, 999_999)), at(23, 59, 0, 0));
    }

    #[test]
    fn deserializes_record_and_ignores_extra_fields() {
        let line = r#"{"timestamp": "2018-12-26 18:11:08.509654","translation_id": "5aa5b2f39f7254a75aa5","source_language": "en","target_language": "fr","client_name": "airliberty","event_name": "translation_delivered","nr_words": 30, "duration": 20}"#;
        let ev: DeliveryEvent = serde_json::from_str(line).unwrap();
        assert_eq!(ev, DeliveryEvent::new(at(18, 11, 8, 509_654), 20.0));
    }

    #[test]
    fn serializes_with_six_fraction_digits() {
        let ev = DeliveryEvent::new(at(18, 11, 8, 500_000), 1.5);
        let s = serde_json::to_string(&ev).unwrap();
        assert_eq!(
            s,
            r#"{"timestamp":"2018-12-26 18:11:08.500000","duration":1.5}"#
        );
    }
}
