//! The TCP ingestion server.
//!
//! Binds a loopback listener, accepts producer connections, and spawns one
//! [`ConnectionHandler`] task per peer. The collector is an internal
//! endpoint by design, so the listener is never exposed beyond 127.0.0.1.

use std::{
    io::ErrorKind,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{atomic::AtomicU64, Arc},
    time::Duration,
};

use thiserror::Error;
use tokio::{net::TcpListener, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::{ingest::connection::ConnectionHandler, stats::StatsCollector};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Errors that can occur while standing up the ingestion server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound. This is fatal; the caller is
    /// expected to abort startup.
    #[error("failed to bind 127.0.0.1:{port}: {source}")]
    Bind {
        /// The configured port.
        port: u16,
        /// The underlying socket error.
        source: std::io::Error,
    },
}

/// Owns the listening socket and the set of live connection handlers.
pub struct IngestionServer {
    listener: TcpListener,
    collector: Arc<StatsCollector>,
    ingested: Arc<AtomicU64>,
    cancellation_token: CancellationToken,
}

impl IngestionServer {
    /// Binds the loopback listener on the given port.
    ///
    /// Port 0 asks the OS for an ephemeral port; use [`Self::local_addr`] to
    /// discover it.
    pub async fn bind(
        port: u16,
        collector: Arc<StatsCollector>,
        ingested: Arc<AtomicU64>,
        cancellation_token: CancellationToken,
    ) -> Result<Self, ServerError> {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { port, source })?;
        Ok(Self { listener, collector, ingested, cancellation_token })
    }

    /// Returns the address the listener is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until shutdown is requested, then waits for
    /// every connection handler to finish before releasing the socket.
    ///
    /// No ingestion activity continues after this returns.
    pub async fn run(self) {
        let mut handlers = JoinSet::new();

        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "ingestion server listening"),
            Err(_) => tracing::info!("ingestion server listening"),
        }

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("ingestion server received shutdown signal, stopping accept loop");
                    break;
                }

                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(%peer, "accepted producer connection");
                        let handler = ConnectionHandler::new(
                            stream,
                            peer,
                            Arc::clone(&self.collector),
                            Arc::clone(&self.ingested),
                            self.cancellation_token.clone(),
                        );
                        handlers.spawn(handler.run());
                    }
                    Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed, stopping ingestion server");
                        break;
                    }
                }
            }
        }

        // Per-connection errors stay local to their handler; here we only
        // wait for all of them to reach their closed state.
        while handlers.join_next().await.is_some() {}
        tracing::info!("ingestion server has shut down");
    }
}
