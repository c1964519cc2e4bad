// Tail loop - turn the paginated event API into an endless ordered feed

use crate::error::{Result, TailError};
use crate::query::{format_millis, Cursor, Direction, FetchRequest, LogQuery};
use crate::sink::{Sink, Status};
use std::future::Future;
use std::io::Write;
use tokio::time::{sleep, Duration};

/// Maximum events requested per fetch
pub const PAGE_LIMIT: usize = 100;

/// Pause between polls once the stream has no forward progress
pub const IDLE_INTERVAL: Duration = Duration::from_secs(2);

/// The stream being tailed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailTarget {
    pub log_group: String,
    pub stream_name: String,
    /// Epoch millis, fixed for the whole session
    pub window_start: i64,
}

/// Why the loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailOutcome {
    /// Shutdown was requested
    Interrupted,
    /// A fetch failed; the loop does not retry
    Failed(String),
}

/// Summary of a finished tail session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailReport {
    pub outcome: TailOutcome,
    pub fetches: usize,
    pub events_emitted: usize,
    pub idle_pauses: usize,
}

/// Follows a single stream using forward tokens.
///
/// The cursor only ever moves forward. A page whose next token equals the
/// current one is treated as "nothing new": its events are dropped and the
/// loop sleeps for the idle interval before polling again.
pub struct Tailer<'q, Q: LogQuery> {
    query: &'q Q,
    target: TailTarget,
    idle_interval: Duration,
    cursor: Option<Cursor>,
}

impl<'q, Q: LogQuery> Tailer<'q, Q> {
    pub fn new(query: &'q Q, target: TailTarget) -> Self {
        Self {
            query,
            target,
            idle_interval: IDLE_INTERVAL,
            cursor: None,
        }
    }

    /// Override the idle pause
    pub fn idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    fn next_request(&self) -> FetchRequest {
        FetchRequest {
            log_group: self.target.log_group.clone(),
            stream_name: self.target.stream_name.clone(),
            start_time: self.target.window_start,
            limit: PAGE_LIMIT,
            direction: Direction::Backward,
            cursor: self.cursor.clone(),
        }
    }

    /// Tail until `shutdown` resolves or a fetch fails.
    ///
    /// Shutdown is checked before every fetch, while a fetch is in flight and
    /// during the idle pause. Events from a completed fetch are always written
    /// in full. Fetch failures end the loop with [`TailOutcome::Failed`];
    /// only sink write failures are returned as `Err`.
    pub async fn run<W, F>(mut self, sink: &mut Sink<W>, shutdown: F) -> Result<TailReport>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        sink.status(&Status::Tailing {
            stream: self.target.stream_name.clone(),
        })?;
        tracing::info!(
            log_group = %self.target.log_group,
            stream = %self.target.stream_name,
            since = %format_millis(self.target.window_start),
            "tailing stream"
        );

        let mut fetches = 0;
        let mut events_emitted = 0;
        let mut idle_pauses = 0;

        let outcome = loop {
            let request = self.next_request();

            let result = tokio::select! {
                biased;
                _ = &mut shutdown => break TailOutcome::Interrupted,
                result = self.query.fetch_events(&request) => result,
            };
            fetches += 1;

            let page = match result {
                Ok(page) => page,
                Err(e) => break TailOutcome::Failed(TailError::FetchError(e.to_string()).to_string()),
            };

            if !page.made_progress(self.cursor.as_ref()) {
                tracing::trace!(cursor = ?self.cursor, "no forward progress");
                sink.status(&Status::Idle)?;
                idle_pauses += 1;

                tokio::select! {
                    biased;
                    _ = &mut shutdown => break TailOutcome::Interrupted,
                    _ = sleep(self.idle_interval) => {}
                }
                continue;
            }

            if page.events.is_empty() {
                sink.status(&Status::Idle)?;
            } else {
                for event in &page.events {
                    sink.event(event)?;
                }
                events_emitted += page.events.len();
                tracing::debug!(count = page.events.len(), "emitted events");
            }

            self.cursor = page.next_cursor;
        };

        match &outcome {
            TailOutcome::Interrupted => {
                tracing::info!(events_emitted, "tail interrupted");
                sink.status(&Status::Interrupted)?;
            }
            TailOutcome::Failed(error) => {
                tracing::error!(error = %error, "tail stopped");
                sink.status(&Status::Errored(error.clone()))?;
            }
        }

        Ok(TailReport {
            outcome,
            fetches,
            events_emitted,
            idle_pauses,
        })
    }
}
