//! # Rolling Window
//! Per-minute moving average over a time-ordered stream of delivery events.
//!
//! A cursor walks minute boundaries starting at the first event's minute.
//! Every boundary at or before an incoming event is emitted with the average
//! of the events currently in the window, then events older than
//! `window_minutes` before the next boundary are dropped from the front.
//! After the last event, boundaries keep being emitted until the window is
//! empty.

use std::collections::VecDeque;

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, trace};

use crate::event::{truncate_to_minute, DeliveryEvent};

/// How the aggregator treats the non-decreasing timestamp precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputOrder {
    /// Assume input is ordered. A regression is not detected and yields
    /// wrong averages instead of an error.
    #[default]
    Trusted,
    /// Reject the first event whose timestamp is earlier than its predecessor.
    Strict,
}

#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("window size must be at least one minute")]
    ZeroWindow,
    #[error(
        "event at {current} arrived after event at {previous}; input must be ordered by timestamp"
    )]
    OutOfOrder {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// One emitted minute boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinuteAverage {
    pub minute: NaiveDateTime,
    /// Mean duration of the active events, `0.0` when there are none.
    pub average: f64,
    pub active_events: usize,
}

/// FIFO of active events with a running sum and count.
#[derive(Debug, Default)]
pub struct MinuteWindow {
    buf: VecDeque<(NaiveDateTime, f64)>,
    sum_durations: f64,
}

impl MinuteWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: &DeliveryEvent) {
        self.buf.push_back((event.timestamp, event.duration));
        self.sum_durations += event.duration;
    }

    /// Drop events from the front whose timestamp is strictly before `cutoff`.
    /// Returns how many were dropped.
    pub fn evict_older_than(&mut self, cutoff: NaiveDateTime) -> usize {
        let mut evicted = 0;
        while let Some(&(t, d)) = self.buf.front() {
            if t < cutoff {
                self.buf.pop_front();
                self.sum_durations -= d;
                evicted += 1;
            } else {
                break;
            }
        }
        if self.buf.is_empty() {
            // no float residue once the window is empty
            self.sum_durations = 0.0;
        }
        evicted
    }

    pub fn average(&self) -> f64 {
        let n = self.buf.len();
        if n > 0 {
            self.sum_durations / n as f64
        } else {
            0.0
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Single-pass aggregator. Feed events with [`push`](Self::push), then call
/// [`finish`](Self::finish) to drain the window.
#[derive(Debug)]
pub struct SlidingAggregator {
    window: MinuteWindow,
    span: Duration,
    ordering: InputOrder,
    current: Option<NaiveDateTime>,
    last_seen: Option<NaiveDateTime>,
}

impl SlidingAggregator {
    pub fn new(window_minutes: u32, ordering: InputOrder) -> Result<Self, AggregateError> {
        if window_minutes == 0 {
            return Err(AggregateError::ZeroWindow);
        }
        Ok(Self {
            window: MinuteWindow::new(),
            span: Duration::minutes(i64::from(window_minutes)),
            ordering,
            current: None,
            last_seen: None,
        })
    }

    /// Emit every minute boundary up to and including `event.timestamp`,
    /// then add the event to the window.
    pub fn push(
        &mut self,
        event: DeliveryEvent,
        out: &mut Vec<MinuteAverage>,
    ) -> Result<(), AggregateError> {
        if let Some(previous) = self.last_seen {
            if self.ordering == InputOrder::Strict && event.timestamp < previous {
                debug!(%previous, current = %event.timestamp, "rejecting out-of-order event");
                return Err(AggregateError::OutOfOrder {
                    previous,
                    current: event.timestamp,
                });
            }
        }
        self.last_seen = Some(event.timestamp);

        let mut current = self
            .current
            .unwrap_or_else(|| truncate_to_minute(event.timestamp));
        while current <= event.timestamp {
            current = self.tick(current, out);
        }
        self.current = Some(current);

        self.window.push(&event);
        Ok(())
    }

    /// Keep emitting boundaries until the window is empty.
    pub fn finish(mut self, out: &mut Vec<MinuteAverage>) {
        let Some(mut current) = self.current else {
            return;
        };
        while !self.window.is_empty() {
            current = self.tick(current, out);
        }
    }

    /// Emit `current`, advance one minute, evict stale events.
    fn tick(&mut self, current: NaiveDateTime, out: &mut Vec<MinuteAverage>) -> NaiveDateTime {
        let entry = MinuteAverage {
            minute: current,
            average: self.window.average(),
            active_events: self.window.len(),
        };
        trace!(
            minute = %entry.minute,
            average = entry.average,
            active = entry.active_events,
            "tick"
        );
        out.push(entry);

        let next = current + Duration::minutes(1);
        let evicted = self.window.evict_older_than(next - self.span);
        if evicted > 0 {
            debug!(
                minute = %next,
                evicted,
                remaining = self.window.len(),
                "evicted stale events"
            );
        }
        next
    }
}

/// Run the aggregator over a whole event sequence.
pub fn moving_averages<I>(
    events: I,
    window_minutes: u32,
    ordering: InputOrder,
) -> Result<Vec<MinuteAverage>, AggregateError>
where
    I: IntoIterator<Item = DeliveryEvent>,
{
    let mut agg = SlidingAggregator::new(window_minutes, ordering)?;
    let mut out = Vec::new();
    for ev in events {
        agg.push(ev, &mut out)?;
    }
    agg.finish(&mut out);
    Ok(out)
}
