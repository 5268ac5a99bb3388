//! Logtide log server client.
//!
//! This crate talks to a log server that exposes three routes under one base
//! URL:
//!
//! - `ws`: a WebSocket pushing one JSON [`LogRecord`] per message
//! - `history`: a JSON array of prior records, newest first
//! - `logs`: an ingest route accepting a [`NewLogEntry`]
//!
//! The primary entry point is [`LogServerClient`]. The live stream is a
//! background task created with [`LogServerClient::stream`] that reconnects
//! on its own and reports [`StreamEvent`]s.
//!
//! # Example
//!
//! ```ignore
//! use logtide_api::{LogServerClient, ReconnectPolicy};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = LogServerClient::new("http://localhost:8000")?;
//!     let history = client.fetch_history(Some(50)).await?;
//!     println!("{} records", history.len());
//!
//!     let (sender, mut events) = tokio::sync::mpsc::channel(256);
//!     client.stream(ReconnectPolicy::default()).spawn(sender);
//!     while let Some(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```

mod client;
pub mod connection;
pub mod endpoints;
pub mod stream;

pub use client::LogServerClient;
pub use connection::{ConnectionMachine, ReconnectPolicy};
pub use endpoints::ServerEndpoints;
pub use logtide_types::{ConnectionState, LevelKind, LogRecord, NewLogEntry};
pub use stream::{LogStream, StreamEvent, decode_record};

use thiserror::Error;

/// Errors returned by the log server client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported server scheme '{0}'; expected http or https")]
    UnsupportedScheme(String),
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
