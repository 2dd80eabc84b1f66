//! Day-aligned `[start, end)` query windows and the day bucketing rule.

use crate::domain::error::DomainError;
use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;

/// Seconds in a UTC calendar day.
pub const ONE_DAY: i64 = 86_400;

/// A validated `[start, end)` range of unix seconds.
///
/// `start` sits on a UTC midnight and the span is a whole number of days, so every
/// bucket computed from it is a day start inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: i64,
    end: i64,
    #[serde(skip)]
    day_length: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Result<Self, DomainError> {
        Self::with_day_length(start, end, ONE_DAY)
    }

    /// Validates the window against a configured day length.
    ///
    /// The day length must divide a UTC day evenly; anything else would produce
    /// buckets that straddle midnight.
    pub fn with_day_length(start: i64, end: i64, day_length: i64) -> Result<Self, DomainError> {
        if day_length <= 0 || ONE_DAY % day_length != 0 {
            return Err(DomainError::InvalidWindow(format!(
                "day length {day_length}s does not evenly divide a UTC day"
            )));
        }
        if start > end {
            return Err(DomainError::InvalidWindow(format!(
                "start {} is after end {}",
                format_timestamp(start),
                format_timestamp(end)
            )));
        }
        if !is_start_of_day(start) {
            return Err(DomainError::InvalidWindow(format!(
                "start {} is not midnight UTC",
                format_timestamp(start)
            )));
        }
        if DateTime::<Utc>::from_timestamp(end, 0).is_none() {
            return Err(DomainError::InvalidWindow(format!("end {end} is out of range")));
        }
        let span = end
            .checked_sub(start)
            .ok_or_else(|| DomainError::InvalidWindow(format!("span from {start} to {end} overflows")))?;
        if span % day_length != 0 {
            return Err(DomainError::InvalidWindow(format!(
                "span of {span}s is not a whole number of {day_length}s days"
            )));
        }
        Ok(Self {
            start,
            end,
            day_length,
        })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn day_length(&self) -> i64 {
        self.day_length
    }

    pub fn num_days(&self) -> usize {
        ((self.end - self.start) / self.day_length) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Every bucket key of the window, oldest first.
    pub fn days(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.num_days() as i64).map(move |i| self.start + i * self.day_length)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// The day start `timestamp` falls in, or `None` when it lies outside the window.
    pub fn bucket(&self, timestamp: i64) -> Option<i64> {
        if !self.contains(timestamp) {
            return None;
        }
        let offset = (timestamp - self.start).div_euclid(self.day_length);
        Some(self.start + self.day_length * offset)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )
    }
}

pub fn is_start_of_day(timestamp: i64) -> bool {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.time() == NaiveTime::MIN)
        .unwrap_or(false)
}

/// `[YYYY-MM-DD HH:MM:SS]` in UTC, used in log output.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("[%Y-%m-%d %H:%M:%S]").to_string(),
        None => format!("[{timestamp}]"),
    }
}
