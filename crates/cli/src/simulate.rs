//! Traffic generator for exercising a log server and its viewers.
//!
//! Two sources: random records drawn from a fixed vocabulary, or the lines
//! appended to a file while it is followed (like `tail -f`). Every entry is
//! posted through the server's ingest route; failed posts are logged and the
//! loop keeps going.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use logtide_api::LogServerClient;
use logtide_types::NewLogEntry;
use logtide_util::{sanitize_for_terminal, truncate_with_ellipsis};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tracing::{info, warn};

const LEVELS: [&str; 4] = ["INFO", "DEBUG", "WARNING", "ERROR"];
const SOURCES: [&str; 4] = ["auth-service", "payment-gateway", "inventory-api", "frontend-app"];
const MESSAGES: [&str; 8] = [
    "User login successful",
    "Database connection timeout",
    "Cache cleared",
    "Invalid API key provided",
    "Transaction processed",
    "High CPU usage detected",
    "New user registered",
    "Failed to fetch resource",
];

/// Source label for records read from a followed file.
pub const FILE_SOURCE: &str = "file-monitor";

const MIN_PAUSE_SECS: f64 = 0.5;
const MAX_PAUSE_SECS: f64 = 2.0;
const FILE_POLL: Duration = Duration::from_millis(100);
const ECHO_WIDTH: usize = 50;

/// Draw one random entry from the fixed vocabulary.
pub fn random_entry<R: Rng + ?Sized>(rng: &mut R) -> NewLogEntry {
    NewLogEntry {
        level: pick(rng, &LEVELS).to_string(),
        source: pick(rng, &SOURCES).to_string(),
        message: pick(rng, &MESSAGES).to_string(),
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, choices: &'static [&'static str]) -> &'static str {
    choices.choose(rng).copied().unwrap_or_default()
}

/// Pause between random entries, uniformly within half a second to two.
pub fn random_pause<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_secs_f64(rng.gen_range(MIN_PAUSE_SECS..MAX_PAUSE_SECS))
}

/// Turn one followed line into an entry.
///
/// A leading `LEVEL:` (any known level, any case) sets the level and is
/// stripped from the message; other lines are sent as `INFO`. Blank lines
/// yield nothing.
pub fn parse_prefixed_line(line: &str) -> Option<NewLogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (level, message) = LEVELS
        .iter()
        .find_map(|level| {
            let bytes = line.as_bytes();
            let len = level.len();
            let matches = bytes.len() > len && bytes[..len].eq_ignore_ascii_case(level.as_bytes()) && bytes[len] == b':';
            matches.then(|| (*level, line[len + 1..].trim()))
        })
        .unwrap_or(("INFO", line));
    Some(NewLogEntry {
        level: level.to_string(),
        source: FILE_SOURCE.to_string(),
        message: message.to_string(),
    })
}

/// Post random entries until Ctrl+C.
async fn run_random(client: &LogServerClient) -> Result<()> {
    let mut rng = StdRng::from_entropy();
    info!(ingest = %client.endpoints().ingest(), "simulating random traffic");
    loop {
        let entry = random_entry(&mut rng);
        publish(client, &entry).await;
        let pause = random_pause(&mut rng);
        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// Follow `path` from its current end and post each new line until Ctrl+C.
async fn run_file(client: &LogServerClient, path: &Path) -> Result<()> {
    let mut file = File::open(path).await.with_context(|| format!("cannot open {}", path.display()))?;
    file.seek(SeekFrom::End(0)).await.with_context(|| format!("cannot seek {}", path.display()))?;
    let mut reader = BufReader::new(file);
    info!(path = %path.display(), ingest = %client.endpoints().ingest(), "following file");

    let mut pending = String::new();
    loop {
        let read = tokio::select! {
            read = reader.read_line(&mut pending) => read.with_context(|| format!("cannot read {}", path.display()))?,
            _ = tokio::signal::ctrl_c() => return Ok(()),
        };
        // A line without its newline is still being written; keep it.
        if read == 0 || !pending.ends_with('\n') {
            tokio::select! {
                _ = tokio::time::sleep(FILE_POLL) => continue,
                _ = tokio::signal::ctrl_c() => return Ok(()),
            }
        }
        if let Some(entry) = parse_prefixed_line(&pending) {
            publish(client, &entry).await;
        }
        pending.clear();
    }
}

async fn publish(client: &LogServerClient, entry: &NewLogEntry) {
    match client.publish(entry).await {
        Ok(stored) => println!("{}", echo_line(&stored.level, &stored.message)),
        Err(error) => warn!(%error, level = %entry.level, "failed to send simulated record"),
    }
}

/// Short confirmation printed for each stored record.
fn echo_line(level: &str, message: &str) -> String {
    format!(
        "sent [{}] {}",
        sanitize_for_terminal(&level.to_uppercase()),
        truncate_with_ellipsis(&sanitize_for_terminal(message), ECHO_WIDTH)
    )
}

/// Where the simulator takes its records from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationSource {
    Random,
    File(PathBuf),
}

impl From<Option<PathBuf>> for SimulationSource {
    fn from(file: Option<PathBuf>) -> Self {
        file.map_or(SimulationSource::Random, SimulationSource::File)
    }
}

pub async fn run(client: &LogServerClient, source: SimulationSource) -> Result<()> {
    match source {
        SimulationSource::Random => run_random(client).await,
        SimulationSource::File(path) => run_file(client, &path).await,
    }
}
