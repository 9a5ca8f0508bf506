//! TCP ingestion: wire parsing, per-connection handlers and the accept loop.

mod connection;
pub mod parser;
mod server;

pub use connection::ConnectionHandler;
pub use server::{IngestionServer, ServerError};
