//! Destinations for producer-emitted log entries.
//!
//! A sink either appends a human-readable line to a local file or pushes the
//! wire form of the entry to a collector over TCP. Several sinks can be
//! fanned out through [`CompositeSink`], where a write counts as successful
//! if at least one destination accepted it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
    net::TcpStream,
    sync::Mutex,
};

use crate::models::LogEntry;

/// Errors surfaced by producer sinks.
#[derive(Debug, Error)]
pub enum SinkWriteError {
    /// The log file could not be opened for appending.
    #[error("failed to open log file {path}: {source}")]
    Open {
        /// The configured file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The collector endpoint could not be reached, including after one
    /// reconnect attempt.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// The configured `host:port` address.
        addr: String,
        /// The underlying socket error.
        source: std::io::Error,
    },

    /// Writing to an established destination failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Every sink in a composite fan-out rejected the entry.
    #[error("all sinks failed: {0}")]
    AllSinksFailed(String),
}

/// A destination for complete log entries.
#[async_trait::async_trait]
pub trait LogSink: Send + Sync {
    /// Writes one entry.
    async fn write(&self, entry: &LogEntry) -> Result<(), SinkWriteError>;

    /// Flushes any buffered output.
    async fn flush(&self) -> Result<(), SinkWriteError> {
        Ok(())
    }
}

/// Appends `ISO8601 LEVEL message` lines to a local file.
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Opens (or creates) the file for appending.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SinkWriteError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| SinkWriteError::Open { path: path.to_path_buf(), source })?;
        Ok(Self { file: Mutex::new(file) })
    }
}

#[async_trait::async_trait]
impl LogSink for FileSink {
    async fn write(&self, entry: &LogEntry) -> Result<(), SinkWriteError> {
        let mut file = self.file.lock().await;
        let line = format!("{}\n", entry.display_line());
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), SinkWriteError> {
        self.file.lock().await.flush().await?;
        Ok(())
    }
}

/// Pushes wire-format lines to a collector over TCP.
///
/// The connection is established lazily and re-established once per write if
/// the send fails; a second failure is reported to the caller. Producers are
/// responsible for any further retry policy.
pub struct TcpSink {
    addr: String,
    conn: Mutex<Option<TcpStream>>,
}

impl TcpSink {
    /// Creates a sink for the given `host:port` collector address.
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), conn: Mutex::new(None) }
    }

    async fn connect(&self) -> Result<TcpStream, SinkWriteError> {
        TcpStream::connect(self.addr.as_str())
            .await
            .map_err(|source| SinkWriteError::Connect { addr: self.addr.clone(), source })
    }
}

#[async_trait::async_trait]
impl LogSink for TcpSink {
    async fn write(&self, entry: &LogEntry) -> Result<(), SinkWriteError> {
        let line = entry.wire_line();
        let mut conn = self.conn.lock().await;

        // The dropped connection stays None on failure, so the next write
        // starts from a fresh connect.
        let mut stream = match conn.take() {
            Some(stream) => stream,
            None => self.connect().await?,
        };
        if let Err(e) = stream.write_all(line.as_bytes()).await {
            tracing::debug!(addr = %self.addr, error = %e, "send failed, reconnecting");
            stream = self.connect().await?;
            stream.write_all(line.as_bytes()).await?;
        }
        *conn = Some(stream);
        Ok(())
    }
}

/// Fans one entry out to several sinks.
pub struct CompositeSink {
    sinks: Vec<Box<dyn LogSink>>,
}

impl CompositeSink {
    /// Creates a fan-out over the given sinks.
    pub fn new(sinks: Vec<Box<dyn LogSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait::async_trait]
impl LogSink for CompositeSink {
    async fn write(&self, entry: &LogEntry) -> Result<(), SinkWriteError> {
        let mut errors = Vec::new();
        let mut any_ok = false;
        for sink in &self.sinks {
            match sink.write(entry).await {
                Ok(()) => any_ok = true,
                Err(e) => errors.push(e.to_string()),
            }
        }
        if any_ok {
            Ok(())
        } else {
            Err(SinkWriteError::AllSinksFailed(errors.join("; ")))
        }
    }

    async fn flush(&self) -> Result<(), SinkWriteError> {
        for sink in &self.sinks {
            sink.flush().await?;
        }
        Ok(())
    }
}
