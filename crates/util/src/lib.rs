pub mod config;
pub mod date_handling;
pub mod text_processing;

pub use config::{ConfigError, ConfigFile, ConfigOverrides, ViewerConfig, default_config_path, default_log_path, expand_tilde};
pub use date_handling::{display_time, parse_timestamp};
pub use text_processing::{sanitize_for_terminal, truncate_with_ellipsis};
