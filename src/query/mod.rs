// Query module - Cursor-based access to a log group

mod cloudwatch;
mod memory;

pub use cloudwatch::CloudWatchLogs;
pub use memory::MemoryLogQuery;

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Errors raised by a [`LogQuery`] backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Log group not found: {0}")]
    GroupNotFound(String),

    #[error("Log stream not found: {0}")]
    StreamNotFound(String),

    #[error("Invalid pagination token: {0}")]
    InvalidToken(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// A stream as reported by the log group listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub name: String,
    /// Epoch millis of the newest event, if the stream has any
    pub last_event_timestamp: Option<i64>,
}

/// A single log event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Epoch millis
    pub timestamp: i64,
    pub message: String,
}

impl LogEvent {
    pub fn new(timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    /// Event time as a UTC instant
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Opaque forward-pagination token returned by each fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which end of the time range an un-cursored read starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Oldest events first
    Forward,
    /// Newest events first (`startFromHead = false`)
    Backward,
}

/// Parameters of a single event fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub log_group: String,
    pub stream_name: String,
    /// Epoch millis; events before this are never returned
    pub start_time: i64,
    pub limit: usize,
    pub direction: Direction,
    pub cursor: Option<Cursor>,
}

/// Result of a single event fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    /// Events in the order returned by the backend
    pub events: Vec<LogEvent>,
    pub next_cursor: Option<Cursor>,
}

impl EventPage {
    /// Whether this page moved the read position past `previous`.
    ///
    /// A missing next cursor or one equal to the previous cursor both mean the
    /// backend has nothing newer to hand out yet.
    pub fn made_progress(&self, previous: Option<&Cursor>) -> bool {
        match &self.next_cursor {
            None => false,
            Some(next) => previous != Some(next),
        }
    }
}

/// One page of the log group listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamPage {
    pub streams: Vec<StreamDescriptor>,
    /// Token for the following page; `None` on the last page
    pub next_page: Option<String>,
}

/// Cursor-based log query capability
pub trait LogQuery: Send + Sync {
    /// List one page of streams in `log_group`, most recently active first
    fn list_streams(
        &self,
        log_group: &str,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<StreamPage, QueryError>> + Send;

    /// Fetch a page of events
    fn fetch_events(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<EventPage, QueryError>> + Send;
}

/// Render epoch millis as an RFC 3339 UTC instant, for diagnostics
pub fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(next: Option<&str>) -> EventPage {
        EventPage {
            events: vec![],
            next_cursor: next.map(Cursor::new),
        }
    }

    #[test]
    fn test_made_progress_first_fetch() {
        assert!(page(Some("f/1")).made_progress(None));
    }

    #[test]
    fn test_made_progress_same_cursor() {
        let previous = Cursor::new("f/1");
        assert!(!page(Some("f/1")).made_progress(Some(&previous)));
        assert!(page(Some("f/2")).made_progress(Some(&previous)));
    }

    #[test]
    fn test_made_progress_missing_cursor() {
        assert!(!page(None).made_progress(None));
        assert!(!page(None).made_progress(Some(&Cursor::new("f/1"))));
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_millis(1_500), "1970-01-01T00:00:01.500Z");
    }
}
