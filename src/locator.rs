// Stream locator - find the most recently active matching stream

use crate::error::{Result, TailError};
use crate::query::{format_millis, Direction, FetchRequest, LogQuery};
use crate::sink::{Sink, Status};
use std::io::Write;

/// What to look for
#[derive(Debug, Clone)]
pub struct StreamSearch<'a> {
    pub log_group: &'a str,
    /// Substring the stream name must contain
    pub filter: &'a str,
    /// Epoch millis; a stream qualifies with at least one event at or after this
    pub window_start: i64,
}

/// Walk the log group's streams newest-first and return the first one whose
/// name contains the filter and which has an event inside the window.
///
/// Listing pages are requested one at a time and the walk stops at the first
/// hit. Backend failures become [`TailError::DiscoveryError`].
pub async fn find_active_stream<Q, W>(
    query: &Q,
    search: &StreamSearch<'_>,
    sink: &mut Sink<W>,
) -> Result<Option<String>>
where
    Q: LogQuery,
    W: Write,
{
    sink.status(&Status::Searching {
        log_group: search.log_group.to_string(),
        filter: search.filter.to_string(),
    })?;

    tracing::debug!(
        log_group = search.log_group,
        filter = search.filter,
        window_start = %format_millis(search.window_start),
        "searching for active stream"
    );

    let mut page_token: Option<String> = None;
    loop {
        let page = query
            .list_streams(search.log_group, page_token.as_deref())
            .await
            .map_err(|e| TailError::DiscoveryError(e.to_string()))?;

        for stream in page.streams {
            if !stream.name.contains(search.filter) {
                continue;
            }

            if has_event_in_window(query, search, &stream.name).await? {
                tracing::info!(stream = %stream.name, "found active stream");
                sink.status(&Status::Found {
                    stream: stream.name.clone(),
                })?;
                return Ok(Some(stream.name));
            }

            tracing::debug!(stream = %stream.name, "no events inside the lookback window");
        }

        match page.next_page {
            Some(next) => page_token = Some(next),
            None => break,
        }
    }

    tracing::info!(log_group = search.log_group, "no matching stream with events");
    sink.status(&Status::NotFound)?;
    Ok(None)
}

/// Probe a stream for its newest event inside the window
async fn has_event_in_window<Q: LogQuery>(
    query: &Q,
    search: &StreamSearch<'_>,
    stream_name: &str,
) -> Result<bool> {
    let probe = FetchRequest {
        log_group: search.log_group.to_string(),
        stream_name: stream_name.to_string(),
        start_time: search.window_start,
        limit: 1,
        direction: Direction::Backward,
        cursor: None,
    };

    let page = query
        .fetch_events(&probe)
        .await
        .map_err(|e| TailError::DiscoveryError(e.to_string()))?;

    Ok(!page.events.is_empty())
}
