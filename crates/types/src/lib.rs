//! Shared type definitions for the Logtide client crates.
//!
//! The wire shape of a log record is owned here so the HTTP client, the
//! WebSocket stream, and the terminal UI all agree on it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One structured log entry as delivered by the log server.
///
/// Records arrive both over the live stream and from the history endpoint.
/// Unknown fields (such as a storage `_id`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Source-supplied instant, usually ISO-8601 without an offset (UTC).
    pub timestamp: String,
    /// Severity label; compared case-insensitively.
    pub level: String,
    /// Free-text origin label (service name, host, ...).
    pub source: String,
    /// Free-text body.
    pub message: String,
}

impl LogRecord {
    pub fn level_kind(&self) -> LevelKind {
        LevelKind::from_label(&self.level)
    }

    /// Upper-cased level label used for display.
    pub fn level_label(&self) -> String {
        self.level.to_uppercase()
    }
}

/// Body accepted by the server's ingest route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLogEntry {
    pub level: String,
    pub source: String,
    pub message: String,
}

/// Coarse classification of a level label that drives styling and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    /// Label equals `error`, ignoring ASCII case.
    Error,
    /// Label equals `warning`, ignoring ASCII case.
    Warning,
    /// Everything else, including `info`, `debug` and `warn`.
    Other,
}

impl LevelKind {
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("error") {
            LevelKind::Error
        } else if label.eq_ignore_ascii_case("warning") {
            LevelKind::Warning
        } else {
            LevelKind::Other
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, LevelKind::Error)
    }
}

/// Connectivity of the live log stream.
///
/// `Connecting` carries the 1-based number of the attempt in flight so the
/// UI can show retry progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting {
        attempt: u64,
    },
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// Label shown in the status badge.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting { .. } => "Connecting",
            ConnectionState::Connected => "Connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting { attempt } => write!(f, "Connecting (attempt {attempt})"),
            other => f.write_str(other.label()),
        }
    }
}
