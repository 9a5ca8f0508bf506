//! Integration tests for the rolling aggregator's public contract.

use tally::{
    models::{Record, Severity},
    stats::{StatsCollector, WINDOW_MS},
    time::now_epoch_ms,
};

fn record(timestamp_ms: u64, severity: Severity, message_len: u64) -> Record {
    Record { timestamp_ms, severity, message_len }
}

#[test]
fn empty_collector_reports_defined_zeroes() {
    let collector = StatsCollector::new();
    let snapshot = collector.snapshot(now_epoch_ms());
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.min_len, 0);
    assert_eq!(snapshot.avg_len, 0.0);
    assert_eq!(snapshot.window_avg_len, 0.0);
}

#[test]
fn length_statistics_follow_the_documented_example() {
    let collector = StatsCollector::new();
    let now = now_epoch_ms();
    for len in [3u64, 7, 5] {
        collector.add(record(now, Severity::Info, len));
    }

    let snapshot = collector.snapshot(now);
    assert_eq!(snapshot.avg_len, 5.0);
    assert_eq!(snapshot.max_len, 7);
    assert_eq!(snapshot.min_len, 3);
}

#[test]
fn stale_entries_leave_the_window_but_not_the_totals() {
    let collector = StatsCollector::new();
    let now = now_epoch_ms();
    collector.add(record(now - 7_200_000, Severity::Error, 10));
    collector.add(record(now - 1_000, Severity::Info, 4));

    let snapshot = collector.snapshot(now);
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.window_total, 1);
    assert_eq!(snapshot.window_by_severity, [0, 0, 1]);
    assert_eq!(snapshot.by_severity, [1, 0, 1]);
}

#[test]
fn snapshot_with_the_same_now_is_idempotent() {
    let collector = StatsCollector::new();
    let now = now_epoch_ms();
    collector.add(record(now - 30_000, Severity::Warning, 12));
    collector.add(record(now - 2 * WINDOW_MS, Severity::Error, 3));

    let first = collector.snapshot(now);
    let second = collector.snapshot(now);
    assert_eq!(first, second);
}

#[test]
fn cumulative_totals_always_dominate_window_totals() {
    let collector = StatsCollector::new();
    let now = now_epoch_ms();
    let offsets = [0u64, 10, 1_800_000, 3_700_000, 7_200_000];
    for (i, offset) in offsets.iter().enumerate() {
        collector.add(record(now - offset, Severity::from_index(i % 3).unwrap(), i as u64));
        let snapshot = collector.snapshot(now);
        assert!(snapshot.total >= snapshot.window_total);
        for bucket in 0..3 {
            assert!(snapshot.by_severity[bucket] >= snapshot.window_by_severity[bucket]);
        }
        assert_eq!(
            snapshot.window_by_severity.iter().sum::<u64>(),
            snapshot.window_total
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_ingestion_loses_nothing() {
    use std::sync::Arc;

    let collector = Arc::new(StatsCollector::new());
    let tasks = 16;
    let per_task = 500;

    let handles: Vec<_> = (0..tasks)
        .map(|t| {
            let collector = Arc::clone(&collector);
            tokio::spawn(async move {
                let now = now_epoch_ms();
                for i in 0..per_task {
                    collector.add(record(
                        now,
                        Severity::from_index(t % 3).unwrap(),
                        (i % 100) as u64,
                    ));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = collector.snapshot(now_epoch_ms());
    assert_eq!(snapshot.total, (tasks * per_task) as u64);
    assert_eq!(snapshot.by_severity.iter().sum::<u64>(), snapshot.total);
}
