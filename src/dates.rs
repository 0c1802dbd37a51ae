//! Effective event time resolution and the recency cutoff.
//!
//! Calendar exports carry either `start.dateTime` (timed events) or
//! `start.date` (all-day events). Both resolve to a naive timestamp: offsets
//! are dropped, not converted, so `10:00+05:00` stays `10:00`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use csv::StringRecord;
use serde::Serialize;

use crate::error::AppError;

/// Column holding the start of a timed event.
pub const START_DATE_TIME_COLUMN: &str = "start.dateTime";

/// Column holding the start of an all-day event.
pub const START_DATE_COLUMN: &str = "start.date";

/// Offset-bearing formats, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Naive date-time formats.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Effective event time of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Resolved(NaiveDateTime),
    /// Neither column is set, or the one consulted is malformed.
    Unresolvable,
}

impl EventTime {
    pub fn as_option(self) -> Option<NaiveDateTime> {
        match self {
            EventTime::Resolved(t) => Some(t),
            EventTime::Unresolvable => None,
        }
    }
}

/// Resolves the effective event time from the two raw column values.
///
/// `start.dateTime` wins whenever it is non-empty. If it is non-empty but
/// malformed the record is unresolvable; `start.date` is only consulted when
/// `start.dateTime` is empty.
pub fn resolve_event_time(date_time: Option<&str>, date: Option<&str>) -> EventTime {
    let date_time = date_time.filter(|s| !s.is_empty());
    let date = date.filter(|s| !s.is_empty());

    let resolved = match (date_time, date) {
        (Some(raw), _) => parse_date_time(raw),
        (None, Some(raw)) => parse_date(raw),
        (None, None) => None,
    };

    resolved.map_or(EventTime::Unresolvable, EventTime::Resolved)
}

/// Parses an ISO-8601 date-time, discarding any offset.
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    // A bare date is a valid ISO date-time at midnight
    parse_date(raw)
}

/// Parses an ISO-8601 calendar date as midnight of that day.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Column positions needed to resolve event times from a record.
#[derive(Debug, Clone, Copy)]
pub struct EventTimeColumns {
    pub date_time: usize,
    pub date: usize,
}

impl EventTimeColumns {
    /// Resolves the effective event time of `record`.
    pub fn resolve(&self, record: &StringRecord) -> EventTime {
        resolve_event_time(record.get(self.date_time), record.get(self.date))
    }
}

/// Lower bound of the recency window. Inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cutoff(NaiveDateTime);

impl Cutoff {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }

    /// Cutoff `days_ago` whole days before `now`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if the result falls outside the
    /// representable calendar range.
    pub fn days_before(now: NaiveDateTime, days_ago: i64) -> Result<Self, AppError> {
        TimeDelta::try_days(days_ago)
            .and_then(|delta| now.checked_sub_signed(delta))
            .map(Self)
            .ok_or_else(|| {
                AppError::InvalidArgument(format!("days_ago out of range: {}", days_ago))
            })
    }

    /// Cutoff `days_ago` whole days before the current local time.
    pub fn days_ago(days_ago: i64) -> Result<Self, AppError> {
        Self::days_before(Local::now().naive_local(), days_ago)
    }

    pub fn at(&self) -> NaiveDateTime {
        self.0
    }

    /// Returns true if `time` is present and on or after the cutoff.
    pub fn accepts(&self, time: EventTime) -> bool {
        match time {
            EventTime::Resolved(t) => t >= self.0,
            EventTime::Unresolvable => false,
        }
    }
}
