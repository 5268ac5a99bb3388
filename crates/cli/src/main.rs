mod simulate;

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logtide_api::{LogServerClient, ReconnectPolicy, StreamEvent};
use logtide_types::{LogRecord, NewLogEntry};
use logtide_util::{ConfigOverrides, ViewerConfig, default_log_path, display_time, expand_tilde, sanitize_for_terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::simulate::SimulationSource;

/// Watch a log server live in the terminal, tail and send records, or
/// simulate traffic.
#[derive(Debug, Parser)]
#[command(name = "logtide", version, about)]
struct Cli {
    /// Base URL of the log server
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,
    /// Number of history records to request at startup
    #[arg(long, global = true, value_name = "N")]
    history_limit: Option<u32>,
    /// Skip the startup history request
    #[arg(long, global = true)]
    no_history: bool,
    /// Delay between a disconnect and the next connection attempt
    #[arg(long, global = true, value_name = "MS")]
    reconnect_delay_ms: Option<u64>,
    /// Maximum number of lines kept on screen
    #[arg(long, global = true, value_name = "N")]
    max_entries: Option<usize>,
    /// Diagnostics filter, e.g. `debug` or `logtide_api=trace`
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print records as plain lines, history first
    Tail,
    /// Post one record to the server's ingest route
    Send {
        #[arg(long, default_value = "info")]
        level: String,
        #[arg(long, default_value = "cli")]
        source: String,
        message: String,
    },
    /// Post random records, or the lines appended to a file, until Ctrl+C
    Simulate {
        /// Follow this file instead of generating random records
        #[arg(long, value_name = "PATH")]
        file: Option<String>,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server: self.server.clone(),
            history_limit: self.history_limit,
            no_history: self.no_history,
            reconnect_delay_ms: self.reconnect_delay_ms,
            max_entries: self.max_entries,
        }
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config.as_deref().map(expand_tilde)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Dropping the guard flushes the file writer, so keep it for all of main.
    let _log_guard = init_tracing(cli.command.is_none(), cli.log_level.as_deref());

    let mut config = ViewerConfig::load(cli.config_path().as_deref()).context("failed to load configuration")?;
    config.apply_overrides(cli.overrides());
    config.validate()?;

    // No subcommand => TUI
    match cli.command {
        None => logtide_tui::run(config).await,
        Some(Command::Tail) => run_tail(config).await,
        Some(Command::Send { level, source, message }) => run_send(&config, NewLogEntry { level, source, message }).await,
        Some(Command::Simulate { file }) => {
            let client = LogServerClient::new(&config.server)?;
            simulate::run(&client, SimulationSource::from(file.as_deref().map(expand_tilde))).await
        }
    }
}

/// Filter precedence: `--log-level`, then `RUST_LOG`, then `info`.
fn build_env_filter(log_level: Option<&str>) -> EnvFilter {
    if let Some(level) = log_level
        && let Ok(filter) = EnvFilter::try_new(level)
    {
        return filter;
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The interactive viewer owns the terminal, so it logs to a daily rolling
/// file through a background writer. The other commands log to stderr.
fn init_tracing(interactive: bool, log_level: Option<&str>) -> Option<WorkerGuard> {
    let filter = build_env_filter(log_level);
    if !interactive {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
        return None;
    }
    let (directory, file_name) = log_file_location(&default_log_path());
    if let Err(error) = std::fs::create_dir_all(&directory) {
        eprintln!("logtide: diagnostics disabled, cannot create {}: {error}", directory.display());
        return None;
    }
    let file_appender = tracing_appender::rolling::daily(&directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(non_blocking)
        .try_init();
    Some(guard)
}

/// Split the configured log path into the directory the rolling appender
/// writes to and the file name prefix it dates.
fn log_file_location(path: &Path) -> (PathBuf, OsString) {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path.file_name().map_or_else(|| OsString::from("logtide.log"), OsString::from);
    (directory, file_name)
}

/// One record as a plain text line: `[HH:MM:SS] LEVEL @source message`.
fn format_plain_line(record: &LogRecord) -> String {
    format!(
        "[{}] {} @{} {}",
        display_time(&record.timestamp),
        sanitize_for_terminal(&record.level_label()),
        sanitize_for_terminal(&record.source),
        sanitize_for_terminal(&record.message)
    )
}

async fn run_tail(config: ViewerConfig) -> Result<()> {
    let client = LogServerClient::new(&config.server)?;
    let mut stdout = io::stdout().lock();

    if config.load_history {
        match client.fetch_history(config.history_limit).await {
            Ok(records) => {
                // newest first on the wire
                for record in records.iter().rev() {
                    writeln!(stdout, "{}", format_plain_line(record))?;
                }
            }
            Err(error) => warn!(%error, "failed to load history"),
        }
    }

    let (sender, mut events) = mpsc::channel(256);
    let stream_task = client.stream(ReconnectPolicy::fixed(config.reconnect_delay)).spawn(sender);

    let outcome = loop {
        tokio::select! {
            Some(event) = events.recv() => match event {
                StreamEvent::Record(record) => {
                    if let Err(error) = writeln!(stdout, "{}", format_plain_line(&record)).and_then(|_| stdout.flush()) {
                        break if error.kind() == io::ErrorKind::BrokenPipe { Ok(()) } else { Err(error.into()) };
                    }
                }
                StreamEvent::Connecting { attempt } => info!(attempt, "connecting"),
                StreamEvent::Opened => info!("connected"),
                StreamEvent::Malformed { .. } => {}
                StreamEvent::Closed { reason, retry_in } => {
                    warn!(reason = reason.as_deref().unwrap_or("none"), retry_in_ms = retry_in.as_millis() as u64, "disconnected");
                }
            },
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };
    stream_task.abort();
    outcome
}

async fn run_send(config: &ViewerConfig, entry: NewLogEntry) -> Result<()> {
    let client = LogServerClient::new(&config.server)?;
    let stored = client
        .publish(&entry)
        .await
        .with_context(|| format!("failed to send record to {}", client.endpoints().ingest()))?;
    println!("{}", format_plain_line(&stored));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_runs_the_viewer_with_global_overrides() {
        let cli = Cli::try_parse_from(["logtide", "--server", "https://logs.example.com", "--no-history", "--max-entries", "50"])
            .expect("parse");
        assert!(cli.command.is_none());
        let overrides = cli.overrides();
        assert_eq!(overrides.server.as_deref(), Some("https://logs.example.com"));
        assert!(overrides.no_history);
        assert_eq!(overrides.max_entries, Some(50));
    }

    #[test]
    fn send_takes_level_source_and_message() {
        let cli = Cli::try_parse_from(["logtide", "send", "--level", "error", "--source", "payment-gateway", "Transaction failed"])
            .expect("parse");
        match cli.command {
            Some(Command::Send { level, source, message }) => {
                assert_eq!(level, "error");
                assert_eq!(source, "payment-gateway");
                assert_eq!(message, "Transaction failed");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["logtide", "tail", "--history-limit", "10", "--reconnect-delay-ms", "500"]).expect("parse");
        assert!(matches!(cli.command, Some(Command::Tail)));
        assert_eq!(cli.history_limit, Some(10));
        assert_eq!(cli.reconnect_delay_ms, Some(500));
    }

    #[test]
    fn simulate_takes_an_optional_file() {
        let cli = Cli::try_parse_from(["logtide", "simulate"]).expect("parse");
        assert!(matches!(cli.command, Some(Command::Simulate { file: None })));

        let cli = Cli::try_parse_from(["logtide", "simulate", "--file", "/var/log/app.log", "--server", "http://h:1"]).expect("parse");
        match cli.command {
            Some(Command::Simulate { file }) => assert_eq!(file.as_deref(), Some("/var/log/app.log")),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.server.as_deref(), Some("http://h:1"));
    }

    #[test]
    fn log_file_splits_into_directory_and_name() {
        let (directory, name) = log_file_location(Path::new("/tmp/logtide/logtide.log"));
        assert_eq!(directory, PathBuf::from("/tmp/logtide"));
        assert_eq!(name, "logtide.log");

        let (directory, name) = log_file_location(Path::new("viewer.log"));
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(name, "viewer.log");
    }

    #[test]
    fn file_logging_writes_through_the_rolling_appender() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (directory, name) = log_file_location(&dir.path().join("logtide.log"));
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&directory, name));
        let subscriber = tracing_subscriber::fmt().with_ansi(false).with_writer(writer).finish();
        tracing::subscriber::with_default(subscriber, || info!("viewer started"));
        drop(guard);

        let written: Vec<_> = std::fs::read_dir(dir.path()).expect("read dir").filter_map(Result::ok).collect();
        assert_eq!(written.len(), 1);
        let file_name = written[0].file_name().to_string_lossy().into_owned();
        assert!(file_name.starts_with("logtide.log."), "{file_name}");
        let contents = std::fs::read_to_string(written[0].path()).expect("read log");
        assert!(contents.contains("viewer started"), "{contents}");
    }

    #[test]
    fn log_level_flag_wins_over_rust_log() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            assert_eq!(build_env_filter(Some("debug")).to_string(), "debug");
            assert_eq!(build_env_filter(None).to_string(), "warn");
        });
        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(build_env_filter(None).to_string(), "info");
        });
    }

    #[test]
    fn plain_lines_are_single_line_and_uppercase_the_level() {
        let record = LogRecord {
            timestamp: "unparseable".into(),
            level: "warning".into(),
            source: "db-cluster".into(),
            message: "Replica lag\nsecond".into(),
        };
        assert_eq!(format_plain_line(&record), "[unparseable] WARNING @db-cluster Replica lag second");
    }

    #[test]
    fn plain_lines_never_carry_control_characters() {
        let record = LogRecord {
            timestamp: "\u{1b}[2J\u{1b}]0;pwned\u{7}".into(),
            level: "info".into(),
            source: "s".into(),
            message: "m".into(),
        };
        let line = format_plain_line(&record);
        assert!(!line.chars().any(char::is_control), "{line:?}");
        assert!(line.ends_with("] INFO @s m"), "{line:?}");
    }
}
