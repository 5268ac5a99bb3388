//! # Logtide terminal viewer
//!
//! A live dashboard for a log server: a connection badge with running
//! counters, a bounded newest-first list of log lines colored by level, and
//! a hint bar. History is loaded once at startup while the live stream
//! connects and reconnects on its own.
//!
//! ## Architecture
//!
//! Each screen region is a component implementing a shared trait. All state
//! lives in `App` and is mutated only by the runtime loop, which receives
//! terminal input, stream events and the history result over channels.

mod app;
mod ui;

use anyhow::Result;
use logtide_util::ViewerConfig;

/// Runs the viewer until the user quits.
///
/// # Errors
///
/// Fails when the configured server URL is unusable or the terminal cannot
/// be set up. Connection problems after startup are never fatal.
pub async fn run(config: ViewerConfig) -> Result<()> {
    ui::runtime::run_app(config).await
}
