// In-process log group with CloudWatch-style forward tokens

use super::{
    Cursor, Direction, EventPage, FetchRequest, LogEvent, LogQuery, QueryError, StreamDescriptor,
    StreamPage,
};
use std::collections::HashMap;
use std::sync::Mutex;

const TOKEN_PREFIX: &str = "f/";

#[derive(Debug, Default)]
struct MemoryStream {
    name: String,
    events: Vec<LogEvent>,
}

impl MemoryStream {
    fn last_event_timestamp(&self) -> Option<i64> {
        self.events.iter().map(|e| e.timestamp).max()
    }
}

#[derive(Debug, Default)]
struct State {
    groups: HashMap<String, Vec<MemoryStream>>,
    fetches: Vec<FetchRequest>,
    list_calls: usize,
}

/// [`LogQuery`] over log groups held in memory.
///
/// Forward tokens encode the index of the next unread event. Once a reader has
/// caught up, the same token is handed back until new events are appended.
#[derive(Debug)]
pub struct MemoryLogQuery {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for MemoryLogQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLogQuery {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: 50,
        }
    }

    /// Number of streams returned per listing page
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Create an empty stream (no-op if it already exists)
    pub fn create_stream(&self, log_group: &str, stream_name: &str) {
        let mut state = self.lock();
        let streams = state.groups.entry(log_group.to_string()).or_default();
        if !streams.iter().any(|s| s.name == stream_name) {
            streams.push(MemoryStream {
                name: stream_name.to_string(),
                events: Vec::new(),
            });
        }
    }

    /// Append events to a stream, creating it if needed.
    ///
    /// Events are kept sorted by timestamp; equal timestamps keep insertion order.
    pub fn put_events<I>(&self, log_group: &str, stream_name: &str, events: I)
    where
        I: IntoIterator<Item = LogEvent>,
    {
        self.create_stream(log_group, stream_name);

        let mut state = self.lock();
        if let Some(stream) = state
            .groups
            .get_mut(log_group)
            .and_then(|streams| streams.iter_mut().find(|s| s.name == stream_name))
        {
            stream.events.extend(events);
            stream.events.sort_by_key(|e| e.timestamp);
        }
    }

    /// Every fetch request received so far, in order
    pub fn fetches(&self) -> Vec<FetchRequest> {
        self.lock().fetches.clone()
    }

    /// Number of listing pages served so far
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave the state half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn page_events(stream: &MemoryStream, request: &FetchRequest) -> Result<EventPage, QueryError> {
        let events = &stream.events;
        let first_in_window = events.partition_point(|e| e.timestamp < request.start_time);
        let limit = request.limit.max(1);

        let (start, end) = match &request.cursor {
            Some(cursor) => {
                let position = parse_token(cursor)?.max(first_in_window);
                (position, (position + limit).min(events.len()))
            }
            None => match request.direction {
                Direction::Forward => (first_in_window, (first_in_window + limit).min(events.len())),
                Direction::Backward => {
                    let end = events.len();
                    (end.saturating_sub(limit).max(first_in_window), end)
                }
            },
        };

        let next = match &request.cursor {
            // Nothing new: hand the caller's token back
            Some(cursor) if start == end => cursor.clone(),
            _ => Cursor::new(format!("{}{:020}", TOKEN_PREFIX, end)),
        };

        Ok(EventPage {
            events: events[start..end].to_vec(),
            next_cursor: Some(next),
        })
    }
}

fn parse_token(cursor: &Cursor) -> Result<usize, QueryError> {
    cursor
        .as_str()
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|index| index.parse().ok())
        .ok_or_else(|| QueryError::InvalidToken(cursor.to_string()))
}

impl LogQuery for MemoryLogQuery {
    async fn list_streams(
        &self,
        log_group: &str,
        page_token: Option<&str>,
    ) -> Result<StreamPage, QueryError> {
        let mut state = self.lock();
        state.list_calls += 1;

        let streams = state
            .groups
            .get(log_group)
            .ok_or_else(|| QueryError::GroupNotFound(log_group.to_string()))?;

        let mut ordered: Vec<StreamDescriptor> = streams
            .iter()
            .map(|s| StreamDescriptor {
                name: s.name.clone(),
                last_event_timestamp: s.last_event_timestamp(),
            })
            .collect();
        // Most recent first; streams without events last
        ordered.sort_by(|a, b| b.last_event_timestamp.cmp(&a.last_event_timestamp));

        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| QueryError::InvalidToken(token.to_string()))?,
            None => 0,
        };

        let end = (offset + self.page_size).min(ordered.len());
        let page = ordered
            .get(offset..end)
            .map(|slice| slice.to_vec())
            .unwrap_or_default();
        let next_page = (end < ordered.len()).then(|| end.to_string());

        Ok(StreamPage {
            streams: page,
            next_page,
        })
    }

    async fn fetch_events(&self, request: &FetchRequest) -> Result<EventPage, QueryError> {
        let mut state = self.lock();
        state.fetches.push(request.clone());

        let stream = state
            .groups
            .get(&request.log_group)
            .ok_or_else(|| QueryError::GroupNotFound(request.log_group.clone()))?
            .iter()
            .find(|s| s.name == request.stream_name)
            .ok_or_else(|| QueryError::StreamNotFound(request.stream_name.clone()))?;

        Self::page_events(stream, request)
    }
}
