// CloudWatch Logs backend

use super::{
    Cursor, Direction, EventPage, FetchRequest, LogEvent, LogQuery, QueryError, StreamDescriptor,
    StreamPage,
};
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatchlogs::config::Region;
use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, SdkError};
use aws_sdk_cloudwatchlogs::operation::describe_log_streams::DescribeLogStreamsError;
use aws_sdk_cloudwatchlogs::operation::get_log_events::GetLogEventsError;
use aws_sdk_cloudwatchlogs::types::OrderBy;
use aws_sdk_cloudwatchlogs::Client;

/// [`LogQuery`] backed by the CloudWatch Logs API
#[derive(Clone, Debug)]
pub struct CloudWatchLogs {
    client: Client,
}

impl CloudWatchLogs {
    /// Wrap an existing SDK client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default credential/region chain.
    ///
    /// `region` overrides whatever the environment or profile says.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;

        tracing::debug!(
            region = ?sdk_config.region().map(|r| r.to_string()),
            "CloudWatch Logs client configured"
        );

        Self::new(Client::new(&sdk_config))
    }
}

impl LogQuery for CloudWatchLogs {
    async fn list_streams(
        &self,
        log_group: &str,
        page_token: Option<&str>,
    ) -> Result<StreamPage, QueryError> {
        let output = self
            .client
            .describe_log_streams()
            .log_group_name(log_group)
            .order_by(OrderBy::LastEventTime)
            .descending(true)
            .set_next_token(page_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| describe_error(log_group, e))?;

        let streams = output
            .log_streams()
            .iter()
            .filter_map(|stream| {
                stream.log_stream_name().map(|name| StreamDescriptor {
                    name: name.to_string(),
                    last_event_timestamp: stream.last_event_timestamp(),
                })
            })
            .collect();

        // The API may echo the request token on the last page
        let next_page = output
            .next_token()
            .filter(|next| Some(*next) != page_token)
            .map(str::to_string);

        Ok(StreamPage { streams, next_page })
    }

    async fn fetch_events(&self, request: &FetchRequest) -> Result<EventPage, QueryError> {
        let output = self
            .client
            .get_log_events()
            .log_group_name(&request.log_group)
            .log_stream_name(&request.stream_name)
            .start_time(request.start_time)
            .limit(i32::try_from(request.limit).unwrap_or(i32::MAX))
            .start_from_head(request.direction == Direction::Forward)
            .set_next_token(request.cursor.as_ref().map(|c| c.as_str().to_string()))
            .send()
            .await
            .map_err(|e| fetch_error(request, e))?;

        let events = output
            .events()
            .iter()
            .map(|event| {
                let timestamp = event.timestamp().ok_or_else(|| {
                    QueryError::Malformed(format!(
                        "event without timestamp in stream {}",
                        request.stream_name
                    ))
                })?;
                Ok(LogEvent::new(timestamp, event.message().unwrap_or_default()))
            })
            .collect::<Result<Vec<_>, QueryError>>()?;

        Ok(EventPage {
            events,
            next_cursor: output.next_forward_token().map(Cursor::new),
        })
    }
}

fn describe_error(log_group: &str, err: SdkError<DescribeLogStreamsError>) -> QueryError {
    let not_found = err
        .as_service_error()
        .map(|e| e.is_resource_not_found_exception())
        .unwrap_or(false);

    if not_found {
        QueryError::GroupNotFound(log_group.to_string())
    } else {
        QueryError::Transport(DisplayErrorContext(&err).to_string())
    }
}

fn fetch_error(request: &FetchRequest, err: SdkError<GetLogEventsError>) -> QueryError {
    match err.as_service_error() {
        Some(e) if e.is_resource_not_found_exception() => {
            QueryError::StreamNotFound(format!("{}/{}", request.log_group, request.stream_name))
        }
        Some(e) if e.is_invalid_parameter_exception() && request.cursor.is_some() => {
            QueryError::InvalidToken(DisplayErrorContext(&err).to_string())
        }
        _ => QueryError::Transport(DisplayErrorContext(&err).to_string()),
    }
}
