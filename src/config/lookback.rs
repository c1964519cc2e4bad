// Lookback window parsing: "30m", "1h", ...

use crate::error::{TailError, Result};
use chrono::{DateTime, Duration, Utc};

/// Unit suffix accepted by [`parse_duration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackUnit {
    Minutes,
    Hours,
}

/// How far back from process start events are considered.
///
/// Fixed once computed; the window start never moves while tailing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookback {
    pub amount: i64,
    pub unit: LookbackUnit,
}

impl Lookback {
    /// Parse a lookback expression of the form `<digits><m|h>`
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || {
            TailError::ConfigError(format!(
                "Invalid lookback '{}'. Use a number followed by m or h, e.g. 30m or 1h",
                input
            ))
        };

        let (digits, unit) = match input.char_indices().last() {
            Some((idx, 'm')) => (&input[..idx], LookbackUnit::Minutes),
            Some((idx, 'h')) => (&input[..idx], LookbackUnit::Hours),
            _ => return Err(invalid()),
        };

        // i64::from_str would also accept a leading '+'
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let amount: i64 = digits.parse().map_err(|_| invalid())?;

        let lookback = Self { amount, unit };
        // Reject values chrono cannot represent
        lookback.try_duration().ok_or_else(invalid)?;

        Ok(lookback)
    }

    fn try_duration(&self) -> Option<Duration> {
        match self.unit {
            LookbackUnit::Minutes => Duration::try_minutes(self.amount),
            LookbackUnit::Hours => Duration::try_hours(self.amount),
        }
    }

    /// The window length as a duration
    pub fn duration(&self) -> Duration {
        // Checked in `parse`
        self.try_duration().unwrap_or_else(Duration::zero)
    }

    /// Absolute start of the window in epoch milliseconds, relative to `now`
    pub fn window_start(&self, now: DateTime<Utc>) -> i64 {
        now.checked_sub_signed(self.duration())
            .map(|start| start.timestamp_millis())
            .unwrap_or(0)
            .max(0)
    }
}

/// Parse a lookback expression into a duration.
///
/// `"0m"` is accepted and yields a zero-length window.
pub fn parse_duration(input: &str) -> Result<Duration> {
    Lookback::parse(input).map(|lookback| lookback.duration())
}
