//! Application state for the Logtide viewer.
//!
//! [`App`] owns everything the screen shows: the rendered log list with its
//! counters, the connection status behind the header badge, and shared
//! context such as the theme and resolved configuration. All state changes
//! flow through [`App::update`] from the single runtime task.

use std::time::Instant;

use logtide_api::StreamEvent;
use logtide_types::{ConnectionState, LogRecord};
use logtide_util::ViewerConfig;
use tracing::{debug, info, warn};

use crate::ui::components::logs::LogsState;
use crate::ui::theme::{DraculaTheme, Theme};

/// Cross-cutting context shared by every component.
#[derive(Debug)]
pub struct SharedCtx {
    /// Active color theme
    pub theme: Box<dyn Theme>,
    /// Resolved viewer configuration
    pub config: ViewerConfig,
}

impl SharedCtx {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            theme: Box::new(DraculaTheme::new()),
            config,
        }
    }
}

/// Connection status as shown by the header badge.
#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// When the next connection attempt is due, while disconnected.
    pub retry_at: Option<Instant>,
    /// Reason reported with the most recent close, if any.
    pub last_error: Option<String>,
}

impl ConnectionStatus {
    /// Whole seconds left until the next attempt, rounded up.
    pub fn retry_in_secs(&self, now: Instant) -> Option<u64> {
        let retry_at = self.retry_at?;
        let remaining = retry_at.saturating_duration_since(now);
        Some(remaining.as_millis().div_ceil(1000) as u64)
    }
}

/// Messages that drive state changes.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic tick for highlight expiry and the reconnect countdown
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Lifecycle or payload event from the stream task
    Stream(StreamEvent),
    /// The startup history request completed (newest first)
    HistoryLoaded(Vec<LogRecord>),
    /// The startup history request failed
    HistoryFailed(String),
}

/// Side effects requested by state changes and components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Put the given text on the system clipboard
    CopyToClipboard(String),
    /// Leave the viewer
    Quit,
}

#[derive(Debug)]
pub struct App {
    /// Shared context (theme, config)
    pub ctx: SharedCtx,
    /// Rendered log lines and counters
    pub logs: LogsState,
    /// Connection status shown in the header
    pub connection: ConnectionStatus,
    /// Set when a visible change happened since the last render
    dirty: bool,
}

impl App {
    pub fn new(config: ViewerConfig) -> Self {
        let logs = LogsState::new(config.max_entries, config.highlight);
        Self {
            ctx: SharedCtx::new(config),
            logs,
            connection: ConnectionStatus::default(),
            dirty: true,
        }
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        self.update_at(msg, Instant::now())
    }

    /// Apply one message as of `now`.
    pub fn update_at(&mut self, msg: Msg, now: Instant) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.logs.expire_highlights(now) || self.connection.retry_at.is_some() {
                    self.dirty = true;
                }
            }
            Msg::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                self.dirty = true;
            }
            Msg::Stream(event) => self.apply_stream_event(event, now),
            Msg::HistoryLoaded(records) => {
                info!(count = records.len(), "history loaded");
                // The server answers newest first; render oldest first so the
                // newest record ends on top.
                for record in records.into_iter().rev() {
                    self.logs.push(record, now);
                }
                self.dirty = true;
            }
            Msg::HistoryFailed(error) => {
                warn!(%error, "failed to load history");
            }
        }
        Vec::new()
    }

    fn apply_stream_event(&mut self, event: StreamEvent, now: Instant) {
        match event {
            StreamEvent::Connecting { attempt } => {
                self.connection.state = ConnectionState::Connecting { attempt };
                self.connection.retry_at = None;
            }
            StreamEvent::Opened => {
                info!("log stream connected");
                self.connection.state = ConnectionState::Connected;
                self.connection.retry_at = None;
                self.connection.last_error = None;
            }
            StreamEvent::Record(record) => self.logs.push(record, now),
            StreamEvent::Malformed { error, .. } => {
                debug!(%error, "skipped malformed stream message");
                return;
            }
            StreamEvent::Closed { reason, retry_in } => {
                info!(reason = reason.as_deref().unwrap_or("none"), retry_in_ms = retry_in.as_millis() as u64, "log stream closed");
                self.connection.state = ConnectionState::Disconnected;
                self.connection.retry_at = Some(now + retry_in);
                self.connection.last_error = reason;
            }
        }
        self.dirty = true;
    }

    /// Clear the list and counters. The connection is left alone.
    pub fn clear_logs(&mut self) {
        self.logs.clear();
        self.dirty = true;
    }

    /// Whether the ticker should run at its fast interval.
    pub fn needs_animation(&self) -> bool {
        self.logs.has_highlights() || self.connection.retry_at.is_some()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Return and reset the render flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
