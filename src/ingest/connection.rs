//! Per-connection ingestion handler.
//!
//! Each accepted producer gets its own handler task, so a slow or stalled
//! peer never delays ingestion from the others. The handler reassembles
//! newline-delimited lines from the byte stream, parses each one, and
//! forwards valid records to the shared collector.

use std::{
    io::ErrorKind,
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{io::AsyncReadExt, net::TcpStream};
use tokio_util::sync::CancellationToken;

use crate::{ingest::parser, stats::StatsCollector};

const READ_CHUNK: usize = 4096;
const RETRY_BACKOFF: Duration = Duration::from_millis(10);

/// Reads one producer's byte stream until EOF, a fatal socket error, or
/// shutdown.
pub struct ConnectionHandler {
    stream: TcpStream,
    peer: SocketAddr,
    collector: Arc<StatsCollector>,
    ingested: Arc<AtomicU64>,
    cancellation_token: CancellationToken,
}

impl ConnectionHandler {
    /// Creates a handler for one accepted connection.
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        collector: Arc<StatsCollector>,
        ingested: Arc<AtomicU64>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self { stream, peer, collector, ingested, cancellation_token }
    }

    /// Runs the read loop until the connection reaches its closed state.
    pub async fn run(mut self) {
        let mut pending: Vec<u8> = Vec::with_capacity(READ_CHUNK);
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    tracing::debug!(peer = %self.peer, "connection handler shutting down");
                    break;
                }

                read = self.stream.read(&mut chunk) => match read {
                    Ok(0) => {
                        tracing::debug!(peer = %self.peer, "peer closed connection");
                        break;
                    }
                    Ok(n) => {
                        pending.extend_from_slice(&chunk[..n]);
                        self.drain_lines(&mut pending);
                    }
                    Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                    Err(e) => {
                        tracing::debug!(peer = %self.peer, error = %e, "closing connection on read error");
                        break;
                    }
                }
            }
        }
    }

    /// Extracts every complete line from the buffer, leaving any bytes after
    /// the last newline as the partial line for the next read.
    fn drain_lines(&self, pending: &mut Vec<u8>) {
        let mut consumed = 0;
        while let Some(offset) = pending[consumed..].iter().position(|&b| b == b'\n') {
            let line = &pending[consumed..consumed + offset];
            consumed += offset + 1;
            match parser::parse_line(line) {
                Ok(record) => {
                    self.collector.add(record);
                    self.ingested.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::trace!(peer = %self.peer, error = %e, "dropping malformed line");
                }
            }
        }
        pending.drain(..consumed);
    }
}
