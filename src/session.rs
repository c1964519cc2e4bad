// Session - locate a stream, then tail it

use crate::error::Result;
use crate::locator::{find_active_stream, StreamSearch};
use crate::query::LogQuery;
use crate::sink::{Sink, Status};
use crate::tail::{TailReport, TailTarget, Tailer};
use std::future::Future;
use std::io::Write;
use tokio::time::Duration;

/// Inputs for one run
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub log_group: String,
    pub filter: String,
    /// Epoch millis, computed once at startup
    pub window_start: i64,
    pub idle_interval: Duration,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A stream was found and tailed until the loop stopped
    Tailed(TailReport),
    /// No stream matched the filter with events inside the window
    NotFound,
    /// Shutdown arrived while still searching
    Interrupted,
}

impl SessionOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionOutcome::Tailed(_) => 0,
            SessionOutcome::NotFound => 1,
            SessionOutcome::Interrupted => 130,
        }
    }
}

/// Find the active stream and tail it until `shutdown` resolves.
///
/// Discovery errors are returned; tail failures end up in the report.
pub async fn run_session<Q, W, F>(
    query: &Q,
    options: &SessionOptions,
    sink: &mut Sink<W>,
    shutdown: F,
) -> Result<SessionOutcome>
where
    Q: LogQuery,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let search = StreamSearch {
        log_group: &options.log_group,
        filter: &options.filter,
        window_start: options.window_start,
    };

    let located = tokio::select! {
        biased;
        _ = &mut shutdown => None,
        result = find_active_stream(query, &search, sink) => Some(result),
    };

    let stream_name = match located {
        None => {
            sink.status(&Status::Interrupted)?;
            return Ok(SessionOutcome::Interrupted);
        }
        Some(result) => match result? {
            Some(name) => name,
            None => return Ok(SessionOutcome::NotFound),
        },
    };

    let target = TailTarget {
        log_group: options.log_group.clone(),
        stream_name,
        window_start: options.window_start,
    };

    let report = Tailer::new(query, target)
        .idle_interval(options.idle_interval)
        .run(sink, &mut shutdown)
        .await?;

    Ok(SessionOutcome::Tailed(report))
}
