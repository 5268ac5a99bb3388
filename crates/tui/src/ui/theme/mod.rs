//! Theme styling module for the TUI UI layer.
//!
//! Components never hard-code colors; they ask the active [`Theme`] for a
//! semantic role (level accent, connection badge, flash highlight, ...).

pub mod dracula;
pub mod roles;
pub mod theme_helpers;

pub use dracula::DraculaTheme;
pub use roles::Theme;
