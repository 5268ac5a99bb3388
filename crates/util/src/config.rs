//! Viewer configuration for the Logtide client.
//!
//! Settings are layered: built-in defaults, then an optional JSON file
//! (`~/.config/logtide/config.json` on most platforms), then environment
//! variables, then command-line overrides applied by the binary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::{config_dir, data_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "LOGTIDE_CONFIG_PATH";
/// Environment variable overriding the server base URL.
pub const SERVER_ENV: &str = "LOGTIDE_SERVER";
/// Environment variable overriding the diagnostics log file path.
pub const LOG_PATH_ENV: &str = "LOGTIDE_LOG_PATH";

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = "logtide.log";

pub const DEFAULT_SERVER: &str = "http://localhost:8000";
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3_000;
pub const DEFAULT_MAX_ENTRIES: usize = 100;
pub const DEFAULT_HIGHLIGHT_MS: u64 = 1_000;

/// Error surfaced when configuration cannot be read or is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// On-disk shape of the configuration file. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub server: Option<String>,
    pub history_limit: Option<u32>,
    pub load_history: Option<bool>,
    pub reconnect_delay_ms: Option<u64>,
    pub max_entries: Option<usize>,
    pub highlight_ms: Option<u64>,
}

/// Values supplied on the command line. `None` leaves the layered value alone.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub server: Option<String>,
    pub history_limit: Option<u32>,
    pub no_history: bool,
    pub reconnect_delay_ms: Option<u64>,
    pub max_entries: Option<usize>,
}

/// Fully resolved settings used by the viewer and the stream client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Base URL of the log server; stream and history paths are derived from it.
    pub server: String,
    /// Optional `limit` sent with the history request.
    pub history_limit: Option<u32>,
    /// Whether history is fetched once at startup.
    pub load_history: bool,
    /// Fixed delay between a disconnect and the next connection attempt.
    pub reconnect_delay: Duration,
    /// Maximum number of visible log lines.
    pub max_entries: usize,
    /// How long a freshly rendered line stays highlighted.
    pub highlight: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            history_limit: None,
            load_history: true,
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            max_entries: DEFAULT_MAX_ENTRIES,
            highlight: Duration::from_millis(DEFAULT_HIGHLIGHT_MS),
        }
    }
}

impl ViewerConfig {
    /// Resolve defaults, the configuration file and the environment.
    ///
    /// An explicit `path` must exist. The default location is optional: a
    /// missing file yields defaults. A file that fails to parse is reported
    /// and ignored.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(explicit) => read_config_file(explicit, true)?,
            None => read_config_file(&default_config_path(), false)?,
        };
        let mut config = Self::default();
        config.merge_file(file);
        config.merge_environment();
        Ok(config)
    }

    pub fn merge_file(&mut self, file: ConfigFile) {
        if let Some(server) = file.server.filter(|value| !value.trim().is_empty()) {
            self.server = server.trim().to_string();
        }
        if file.history_limit.is_some() {
            self.history_limit = file.history_limit;
        }
        if let Some(load_history) = file.load_history {
            self.load_history = load_history;
        }
        if let Some(delay) = file.reconnect_delay_ms {
            self.reconnect_delay = Duration::from_millis(delay);
        }
        if let Some(max_entries) = file.max_entries {
            self.max_entries = max_entries;
        }
        if let Some(highlight) = file.highlight_ms {
            self.highlight = Duration::from_millis(highlight);
        }
    }

    fn merge_environment(&mut self) {
        if let Ok(server) = env::var(SERVER_ENV) {
            let trimmed = server.trim();
            if !trimmed.is_empty() {
                self.server = trimmed.to_string();
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(server) = overrides.server {
            self.server = server;
        }
        if overrides.history_limit.is_some() {
            self.history_limit = overrides.history_limit;
        }
        if overrides.no_history {
            self.load_history = false;
        }
        if let Some(delay) = overrides.reconnect_delay_ms {
            self.reconnect_delay = Duration::from_millis(delay);
        }
        if let Some(max_entries) = overrides.max_entries {
            self.max_entries = max_entries;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::Invalid("max_entries must be at least 1".into()));
        }
        if self.server.trim().is_empty() {
            return Err(ConfigError::Invalid("server must not be empty".into()));
        }
        Ok(())
    }
}

/// Location of the configuration file, honoring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Some(path) = env_path(CONFIG_PATH_ENV) {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logtide")
        .join(CONFIG_FILE_NAME)
}

/// Location of the diagnostics log written while the terminal UI runs,
/// honoring [`LOG_PATH_ENV`].
pub fn default_log_path() -> PathBuf {
    if let Some(path) = env_path(LOG_PATH_ENV) {
        return path;
    }
    data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("logtide")
        .join(LOG_FILE_NAME)
}

pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    let value = env::var(name).ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| expand_tilde(trimmed))
}

fn read_config_file(path: &Path, required: bool) -> Result<ConfigFile, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(file) => {
                debug!(path = %path.display(), "loaded config file");
                Ok(file)
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(ConfigFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound && !required => Ok(ConfigFile::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
