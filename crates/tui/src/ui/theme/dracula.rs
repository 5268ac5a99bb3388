use ratatui::style::Color;

use super::roles::{Theme, ThemeRoles};

// Dracula base palette (https://draculatheme.com/contribute)
pub const BG: Color = Color::Rgb(0x28, 0x2A, 0x36); // #282a36
pub const CURRENT_LINE: Color = Color::Rgb(0x44, 0x47, 0x5A); // #44475a
pub const FOREGROUND: Color = Color::Rgb(0xF8, 0xF8, 0xF2); // #f8f8f2
pub const COMMENT: Color = Color::Rgb(0x62, 0x72, 0xA4); // #6272a4
pub const CYAN: Color = Color::Rgb(0x8B, 0xE9, 0xFD); // #8be9fd
pub const PINK: Color = Color::Rgb(0xFF, 0x79, 0xC6); // #ff79c6

// Level accents and status colors shared with the web dashboard
pub const LEVEL_ERROR: Color = Color::Rgb(0xEF, 0x44, 0x44); // #ef4444
pub const LEVEL_WARNING: Color = Color::Rgb(0xF5, 0x9E, 0x0B); // #f59e0b
pub const LEVEL_DEFAULT: Color = Color::Rgb(0x3B, 0x82, 0xF6); // #3b82f6
pub const SOURCE_BLUE: Color = Color::Rgb(0x60, 0xA5, 0xFA); // #60a5fa
pub const STATUS_CONNECTED: Color = Color::Rgb(0x4A, 0xDE, 0x80); // #4ade80
pub const STATUS_DISCONNECTED: Color = Color::Rgb(0xF8, 0x71, 0x71); // #f87171
pub const FLASH_BG: Color = Color::Rgb(0x1E, 0x2A, 0x4A); // dark blue wash

/// Default theme tuned for dark terminals.
#[derive(Debug, Clone)]
pub struct DraculaTheme {
    roles: ThemeRoles,
}

impl DraculaTheme {
    pub fn new() -> Self {
        Self {
            roles: ThemeRoles {
                background: BG,
                surface: BG,
                border: CURRENT_LINE,

                text: FOREGROUND,
                text_secondary: COMMENT,
                text_muted: COMMENT,

                accent_primary: PINK,
                source: SOURCE_BLUE,

                level_error: LEVEL_ERROR,
                level_warning: LEVEL_WARNING,
                level_default: LEVEL_DEFAULT,

                connected: STATUS_CONNECTED,
                connecting: LEVEL_WARNING,
                disconnected: STATUS_DISCONNECTED,

                flash_bg: FLASH_BG,
                selection_bg: CURRENT_LINE,
                selection_fg: FOREGROUND,
                focus: CYAN,

                scrollbar_track: CURRENT_LINE,
                scrollbar_thumb: COMMENT,
            },
        }
    }
}

impl Default for DraculaTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme for DraculaTheme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}
