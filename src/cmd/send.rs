//! The interactive `send` command: reads lines from stdin and forwards them
//! to a log file and/or a collector.

use clap::Parser;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    models::{ParseSeverityError, Severity},
    producer::{parse_leveled_line, CompositeSink, FileSink, LogSink, Logger, SinkWriteError, TcpSink},
};

/// Errors that end the `send` command.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading stdin failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A sink could not be set up.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkWriteError),
    /// The `--level` flag did not name a severity.
    #[error("Bad level: {0}")]
    BadLevel(#[from] ParseSeverityError),
    /// Neither `--file` nor `--socket` was supplied.
    #[error("Need at least --file or --socket")]
    NoSink,
}

/// Arguments for the `send` command.
#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Append entries to this log file.
    #[arg(short, long)]
    file: Option<String>,
    /// Forward entries to a collector at this host:port address.
    #[arg(short, long)]
    socket: Option<String>,
    /// Default severity for lines without an explicit level.
    #[arg(short, long, default_value = "info")]
    level: String,
}

/// Reads stdin until EOF or `/quit`, logging each line.
///
/// Lines may carry a leading level (`[WARN] message`, `ERROR: message`);
/// `/level <lvl>` switches the default severity at runtime.
pub async fn execute(args: SendArgs) -> Result<(), Error> {
    let default_level: Severity = args.level.parse()?;

    let mut sinks: Vec<Box<dyn LogSink>> = Vec::new();
    if let Some(path) = &args.file {
        sinks.push(Box::new(FileSink::open(path).await?));
    }
    if let Some(addr) = &args.socket {
        sinks.push(Box::new(TcpSink::new(addr.clone())));
    }
    let sink: Box<dyn LogSink> = if sinks.is_empty() {
        return Err(Error::NoSink);
    } else if sinks.len() == 1 {
        sinks.remove(0)
    } else {
        Box::new(CompositeSink::new(sinks))
    };
    let logger = Logger::new(sink, default_level);

    eprintln!("Default level: {}", logger.threshold());
    eprintln!("Enter lines (or /quit):");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line == "/quit" {
            break;
        }
        if let Some(rest) = line.strip_prefix("/level") {
            match rest.trim().parse::<Severity>() {
                Ok(level) => {
                    logger.set_threshold(level);
                    eprintln!("Default level set to {level}");
                }
                Err(_) => eprintln!("Usage: /level <info|warn|error>"),
            }
            continue;
        }

        let (severity, message) = parse_leveled_line(&line, logger.threshold());
        if let Err(e) = logger.log(severity, &message).await {
            eprintln!("log failed: {e}");
        }
    }

    if let Err(e) = logger.flush().await {
        eprintln!("flush failed: {e}");
    }
    Ok(())
}
