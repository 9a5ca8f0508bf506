//! The Supervisor manages the lifecycle of the collector.
//!
//! It owns the shared aggregate, wires the ingestion server and the reporter
//! together, and coordinates graceful shutdown: a signal-handler task cancels
//! a shared token, every loop observes the token at its next safe point, and
//! `run` only returns once all tasks have finished.

use std::sync::{atomic::AtomicU64, Arc};

use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    ingest::{IngestionServer, ServerError},
    reporter::{Reporter, ReportSink, ReportTriggers},
    stats::StatsCollector,
};

/// Errors that can occur during the supervisor's operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The ingestion server could not be started. Fatal: nothing has been
    /// ingested yet and the process should exit.
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// The primary runtime manager for the collector.
pub struct Supervisor {
    /// Shared application configuration.
    config: AppConfig,

    /// The shared rolling aggregate.
    collector: Arc<StatsCollector>,

    /// Records ingested since the last report, shared between the connection
    /// handlers and the reporter.
    since_last: Arc<AtomicU64>,

    /// The sink that receives emitted reports.
    sink: Arc<dyn ReportSink>,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: CancellationToken,
}

impl Supervisor {
    /// Creates a supervisor from validated configuration and a report sink.
    pub fn new(config: AppConfig, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            config,
            collector: Arc::new(StatsCollector::new()),
            since_last: Arc::new(AtomicU64::new(0)),
            sink,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Returns the shared collector, mainly so callers can inspect totals.
    pub fn collector(&self) -> Arc<StatsCollector> {
        Arc::clone(&self.collector)
    }

    /// Starts the collector and blocks until shutdown completes.
    ///
    /// Binds the listener first so bind failures surface before any task is
    /// spawned, then runs the signal handler, the accept loop and the
    /// reporter until a termination signal arrives.
    pub async fn run(self) -> Result<(), SupervisorError> {
        let mut join_set = tokio::task::JoinSet::new();

        let server = IngestionServer::bind(
            self.config.listen_port,
            Arc::clone(&self.collector),
            Arc::clone(&self.since_last),
            self.cancellation_token.clone(),
        )
        .await?;

        // Spawn a task to listen for shutdown signals.
        let cancellation_token = self.cancellation_token.clone();
        join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler")
                    .recv()
                    .await;
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
            }

            cancellation_token.cancel();
        });

        join_set.spawn(server.run());

        let reporter = Reporter::new(
            Arc::clone(&self.collector),
            Arc::clone(&self.sink),
            Arc::clone(&self.since_last),
            ReportTriggers {
                every_n_records: self.config.report_every_n_records,
                max_interval: self.config.report_after_secs,
            },
            self.config.reporter_tick_ms,
            self.cancellation_token.clone(),
        );
        join_set.spawn(reporter.run());

        // All supervised tasks run until shutdown; one finishing early means
        // something went wrong, so the rest are brought down too.
        loop {
            tokio::select! {
                maybe_result = join_set.join_next() => {
                    match maybe_result {
                        Some(result) => {
                            if let Err(e) = result {
                                tracing::error!("A supervised task failed: {:?}.", e);
                            }
                            if !self.cancellation_token.is_cancelled() {
                                tracing::warn!("A supervised task exited early, initiating shutdown.");
                                self.cancellation_token.cancel();
                            }
                        }
                        None => break,
                    }
                }
                _ = self.cancellation_token.cancelled() => break,
            }
        }

        let shutdown_timeout = self.config.shutdown_timeout_secs;
        let drain = async {
            while join_set.join_next().await.is_some() {}
        };
        if tokio::time::timeout(shutdown_timeout, drain).await.is_err() {
            tracing::warn!(
                "Tasks did not finish within {:?}, aborting the remainder.",
                shutdown_timeout
            );
            join_set.shutdown().await;
        }

        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}
