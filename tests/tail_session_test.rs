use chrono::Utc;
use streamtail::config::Lookback;
use streamtail::locator::{find_active_stream, StreamSearch};
use streamtail::query::{LogEvent, MemoryLogQuery};
use streamtail::session::{run_session, SessionOptions, SessionOutcome};
use streamtail::sink::Sink;
use streamtail::tail::{TailOutcome, TailTarget, Tailer};
use tokio::time::{sleep, Duration};

const GROUP: &str = "/aws/eks/eks-test-cluster";
const MINUTE: i64 = 60_000;

fn plain_sink() -> Sink<Vec<u8>> {
    Sink::new(Vec::new()).color(false)
}

fn lines(sink: Sink<Vec<u8>>) -> Vec<String> {
    String::from_utf8(sink.into_inner())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_locate_and_tail_worker_stream() {
    let now = Utc::now();
    let now_ms = now.timestamp_millis();
    let window_start = Lookback::parse("30m").unwrap().window_start(now);

    let query = MemoryLogQuery::new();
    query.put_events(
        GROUP,
        "worker-2",
        [
            LogEvent::new(now_ms - 3 * MINUTE, "job 1 started"),
            LogEvent::new(now_ms - 2 * MINUTE, "job 1 finished"),
            LogEvent::new(now_ms - MINUTE, "job 2 started"),
        ],
    );
    query.put_events(
        GROUP,
        "worker-1",
        [LogEvent::new(now_ms - 40 * MINUTE, "stale")],
    );

    let options = SessionOptions {
        log_group: GROUP.to_string(),
        filter: "worker".to_string(),
        window_start,
        idle_interval: Duration::from_millis(5),
    };

    let mut sink = plain_sink();
    let outcome = run_session(&query, &options, &mut sink, sleep(Duration::from_millis(100)))
        .await
        .unwrap();

    let report = match outcome {
        SessionOutcome::Tailed(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(report.outcome, TailOutcome::Interrupted);
    assert_eq!(report.events_emitted, 3);
    assert!(report.idle_pauses >= 1);

    let output = lines(sink);
    assert!(output[0].contains("Searching"));
    assert_eq!(output[1], "✓ Found stream with events: worker-2");
    assert_eq!(output[2], "📡 Tailing stream: worker-2");
    assert!(output[3].ends_with("job 1 started"));
    assert!(output[4].ends_with("job 1 finished"));
    assert!(output[5].ends_with("job 2 started"));
    assert_eq!(output[6], "⏳ No new log events...");
    assert_eq!(output.last().unwrap(), "🛑 Interrupted by user");
    assert!(output.iter().all(|l| !l.contains("stale")));
}

#[tokio::test]
async fn test_stale_streams_are_not_found() {
    let now = Utc::now();
    let now_ms = now.timestamp_millis();
    let window_start = Lookback::parse("30m").unwrap().window_start(now);

    let query = MemoryLogQuery::new();
    query.put_events(
        GROUP,
        "worker-1",
        [LogEvent::new(now_ms - 40 * MINUTE, "stale")],
    );

    let options = SessionOptions {
        log_group: GROUP.to_string(),
        filter: "worker".to_string(),
        window_start,
        idle_interval: Duration::from_millis(5),
    };

    let mut sink = plain_sink();
    let outcome = run_session(&query, &options, &mut sink, std::future::pending())
        .await
        .unwrap();
    assert_eq!(outcome, SessionOutcome::NotFound);
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_zero_lookback_only_matches_future_events() {
    let now = Utc::now();
    let window_start = Lookback::parse("0m").unwrap().window_start(now);
    assert_eq!(window_start, now.timestamp_millis());

    let query = MemoryLogQuery::new();
    query.put_events(GROUP, "utility-a", [LogEvent::new(window_start - 1, "just before")]);

    let search = StreamSearch {
        log_group: GROUP,
        filter: "utility",
        window_start,
    };
    let found = find_active_stream(&query, &search, &mut plain_sink())
        .await
        .unwrap();
    assert_eq!(found, None);

    query.put_events(GROUP, "utility-a", [LogEvent::new(window_start, "right now")]);
    let found = find_active_stream(&query, &search, &mut plain_sink())
        .await
        .unwrap();
    assert_eq!(found.as_deref(), Some("utility-a"));
}

#[tokio::test]
async fn test_rerun_from_fresh_cursor_is_identical() {
    let query = MemoryLogQuery::new();
    query.put_events(
        GROUP,
        "utility-1",
        (0..40).map(|i| LogEvent::new(1_000 + i * 10, format!("entry {}", i))),
    );

    let target = TailTarget {
        log_group: GROUP.to_string(),
        stream_name: "utility-1".to_string(),
        window_start: 1_000,
    };

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut sink = plain_sink();
        Tailer::new(&query, target.clone())
            .idle_interval(Duration::from_millis(2))
            .run(&mut sink, sleep(Duration::from_millis(40)))
            .await
            .unwrap();

        let events: Vec<String> = lines(sink)
            .into_iter()
            .filter(|l| l.starts_with('['))
            .collect();
        runs.push(events);
    }

    assert_eq!(runs[0].len(), 40);
    assert_eq!(runs[0], runs[1]);
}
