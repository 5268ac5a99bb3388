use std::fmt::Debug;

use logtide_types::{ConnectionState, LevelKind};
use ratatui::style::{Color, Modifier, Style};

/// Semantic color roles used throughout the UI.
#[derive(Debug, Clone)]
pub struct ThemeRoles {
    pub background: Color,
    pub surface: Color,
    pub border: Color,

    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub accent_primary: Color,
    pub source: Color,

    /// Accent bar for `error` lines.
    pub level_error: Color,
    /// Accent bar for `warning` lines.
    pub level_warning: Color,
    /// Accent bar for every other level.
    pub level_default: Color,

    pub connected: Color,
    pub connecting: Color,
    pub disconnected: Color,

    /// Background of a freshly rendered line.
    pub flash_bg: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub focus: Color,

    pub scrollbar_track: Color,
    pub scrollbar_thumb: Color,
}

/// Theme trait exposes semantic roles and common style builders.
pub trait Theme: Send + Sync + Debug {
    fn roles(&self) -> &ThemeRoles;

    fn text_primary_style(&self) -> Style {
        Style::default().fg(self.roles().text)
    }
    fn text_secondary_style(&self) -> Style {
        Style::default().fg(self.roles().text_secondary)
    }
    fn text_muted_style(&self) -> Style {
        Style::default().fg(self.roles().text_muted)
    }

    fn border_style(&self, focused: bool) -> Style {
        let color = if focused { self.roles().focus } else { self.roles().border };
        Style::default().fg(color)
    }

    fn selection_style(&self) -> Style {
        Style::default().fg(self.roles().selection_fg).bg(self.roles().selection_bg)
    }

    fn accent_emphasis_style(&self) -> Style {
        Style::default().fg(self.roles().accent_primary).add_modifier(Modifier::BOLD)
    }

    fn source_style(&self) -> Style {
        Style::default().fg(self.roles().source)
    }

    fn flash_style(&self) -> Style {
        Style::default().bg(self.roles().flash_bg)
    }

    /// Color of the left accent bar for a level.
    fn level_color(&self, kind: LevelKind) -> Color {
        match kind {
            LevelKind::Error => self.roles().level_error,
            LevelKind::Warning => self.roles().level_warning,
            LevelKind::Other => self.roles().level_default,
        }
    }

    fn level_style(&self, kind: LevelKind) -> Style {
        Style::default().fg(self.level_color(kind)).add_modifier(Modifier::BOLD)
    }

    fn connection_color(&self, state: ConnectionState) -> Color {
        match state {
            ConnectionState::Connected => self.roles().connected,
            ConnectionState::Connecting { .. } => self.roles().connecting,
            ConnectionState::Disconnected => self.roles().disconnected,
        }
    }
}
