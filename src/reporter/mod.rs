//! The background reporting loop.
//!
//! The reporter ticks at a fixed short interval and decides, on each tick,
//! whether to emit a snapshot. Two triggers are checked independently: a
//! count of newly ingested records and the time elapsed since the previous
//! report. Either can be disabled by configuring it to zero; configuration
//! validation guarantees at least one stays enabled.

mod sink;

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio_util::sync::CancellationToken;

pub use sink::{render, JsonReportSink, ReportSink, SinkError, StdoutReportSink};
#[cfg(test)]
pub use sink::MockReportSink;

use crate::{stats::StatsCollector, time::now_epoch_ms};

/// Trigger thresholds for the reporting loop.
#[derive(Debug, Clone, Copy)]
pub struct ReportTriggers {
    /// Emit after this many new records; 0 disables the count trigger.
    pub every_n_records: u64,
    /// Emit at least this often; zero disables the time trigger.
    pub max_interval: Duration,
}

/// Periodically snapshots the collector and hands the result to a sink.
pub struct Reporter {
    collector: Arc<StatsCollector>,
    sink: Arc<dyn ReportSink>,
    /// Records ingested since the last report. Incremented on the ingestion
    /// path, outside the aggregator's lock, to keep contention low.
    since_last: Arc<AtomicU64>,
    triggers: ReportTriggers,
    tick: Duration,
    cancellation_token: CancellationToken,
}

impl Reporter {
    /// Creates a reporter over the shared collector and ingestion counter.
    pub fn new(
        collector: Arc<StatsCollector>,
        sink: Arc<dyn ReportSink>,
        since_last: Arc<AtomicU64>,
        triggers: ReportTriggers,
        tick: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self { collector, sink, since_last, triggers, tick, cancellation_token }
    }

    /// Runs the tick loop until shutdown is requested.
    pub async fn run(self) {
        let mut last_report = tokio::time::Instant::now();

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("reporter received shutdown signal, stopping");
                    break;
                }

                _ = tokio::time::sleep(self.tick) => {
                    if self.check_triggers(last_report.elapsed()).await {
                        last_report = tokio::time::Instant::now();
                    }
                }
            }
        }
        tracing::info!("reporter has shut down");
    }

    /// Evaluates both triggers; returns whether the last-report timestamp
    /// should reset. A satisfied trigger resets the timestamp even when the
    /// report itself is suppressed because nothing new arrived, so the time
    /// trigger measures from the last firing rather than re-arming every
    /// tick.
    async fn check_triggers(&self, since_report: Duration) -> bool {
        let new_records = self.since_last.load(Ordering::Relaxed);
        let count_reached =
            self.triggers.every_n_records > 0 && new_records >= self.triggers.every_n_records;
        let time_reached = !self.triggers.max_interval.is_zero()
            && since_report >= self.triggers.max_interval;

        if !(count_reached || time_reached) {
            return false;
        }

        if new_records > 0 {
            let snapshot = self.collector.snapshot(now_epoch_ms());
            tracing::debug!(
                new_records,
                total = snapshot.total,
                window_total = snapshot.window_total,
                "emitting report"
            );
            if let Err(e) = self.sink.publish(&snapshot).await {
                tracing::error!(error = %e, "failed to publish report");
            }
            self.since_last.store(0, Ordering::Relaxed);
        }
        true
    }
}
