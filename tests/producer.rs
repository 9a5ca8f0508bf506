//! Integration tests for the producer-side sinks against real files and
//! sockets.

use std::sync::{atomic::AtomicU64, Arc};
use std::time::Duration;

use tally::{
    ingest::IngestionServer,
    models::{LogEntry, Severity},
    producer::{CompositeSink, FileSink, LogOutcome, LogSink, Logger, TcpSink},
    stats::StatsCollector,
    time::now_epoch_ms,
};
use tokio_util::sync::CancellationToken;

fn entry(severity: Severity, message: &str) -> LogEntry {
    LogEntry { timestamp_ms: 1_700_000_000_000, severity, message: message.to_string() }
}

#[tokio::test]
async fn file_sink_appends_formatted_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    let sink = FileSink::open(&path).await.unwrap();
    sink.write(&entry(Severity::Info, "started")).await.unwrap();
    sink.write(&entry(Severity::Error, "broke")).await.unwrap();
    sink.flush().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "2023-11-14T22:13:20Z INFO started\n2023-11-14T22:13:20Z ERROR broke\n"
    );
}

#[tokio::test]
async fn file_sink_appends_across_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    {
        let sink = FileSink::open(&path).await.unwrap();
        sink.write(&entry(Severity::Info, "first")).await.unwrap();
        sink.flush().await.unwrap();
    }
    {
        let sink = FileSink::open(&path).await.unwrap();
        sink.write(&entry(Severity::Info, "second")).await.unwrap();
        sink.flush().await.unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[tokio::test]
async fn tcp_sink_feeds_a_live_collector() {
    let collector = Arc::new(StatsCollector::new());
    let token = CancellationToken::new();
    let server = IngestionServer::bind(
        0,
        Arc::clone(&collector),
        Arc::new(AtomicU64::new(0)),
        token.clone(),
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();
    let handle = tokio::spawn(server.run());

    let sink = TcpSink::new(addr.to_string());
    let logger = Logger::new(Box::new(sink), Severity::Info);
    assert_eq!(logger.log(Severity::Warning, "over the wire").await.unwrap(), LogOutcome::Written);
    assert_eq!(logger.log(Severity::Info, "and again").await.unwrap(), LogOutcome::Written);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while collector.snapshot(now_epoch_ms()).total < 2 {
        assert!(tokio::time::Instant::now() < deadline, "collector never saw the entries");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let snapshot = collector.snapshot(now_epoch_ms());
    assert_eq!(snapshot.by_severity, [0, 1, 1]);
    assert_eq!(snapshot.max_len, "over the wire".len() as u64);

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn tcp_sink_fails_when_no_collector_listens() {
    // Bind and immediately drop a listener to get a port nothing listens on.
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = unused.local_addr().unwrap();
    drop(unused);

    let sink = TcpSink::new(addr.to_string());
    assert!(sink.write(&entry(Severity::Info, "nobody home")).await.is_err());
}

#[tokio::test]
async fn composite_sink_succeeds_if_any_destination_does() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    // A dead TCP endpoint next to a healthy file sink.
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = unused.local_addr().unwrap();
    drop(unused);

    let composite = CompositeSink::new(vec![
        Box::new(TcpSink::new(dead_addr.to_string())),
        Box::new(FileSink::open(&path).await.unwrap()),
    ]);
    composite.write(&entry(Severity::Info, "partial delivery")).await.unwrap();
    composite.flush().await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("partial delivery"));
}
