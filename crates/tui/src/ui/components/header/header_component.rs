use std::time::Instant;

use logtide_types::{ConnectionState, LevelKind};
use logtide_util::sanitize_for_terminal;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{App, ConnectionStatus};
use crate::ui::components::component::Component;
use crate::ui::components::logs::LogCounters;
use crate::ui::theme::{Theme, theme_helpers as th};

const SEPARATOR: &str = "  │  ";

#[derive(Debug, Default)]
pub struct HeaderComponent;

impl HeaderComponent {
    /// Status badge followed by the reconnect countdown while one is pending.
    fn badge_spans(theme: &dyn Theme, status: &ConnectionStatus, now: Instant) -> Vec<Span<'static>> {
        let color = theme.connection_color(status.state);
        let mut spans = vec![
            Span::styled("● ", Style::default().fg(color)),
            Span::styled(status.state.label(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ];
        if let Some(secs) = status.retry_in_secs(now) {
            spans.push(Span::styled(format!(" (retrying in {secs}s)"), theme.text_muted_style()));
        }
        match (status.state, status.last_error.as_deref()) {
            (ConnectionState::Connecting { attempt }, _) if attempt > 1 => {
                spans.push(Span::styled(format!(" (attempt {attempt})"), theme.text_muted_style()));
            }
            (ConnectionState::Disconnected, Some(reason)) => {
                spans.push(Span::styled(format!(" · {}", sanitize_for_terminal(reason)), theme.text_muted_style()));
            }
            _ => {}
        }
        spans
    }

    fn counter_spans(theme: &dyn Theme, counters: LogCounters) -> Vec<Span<'static>> {
        let errors_style = if counters.errors > 0 {
            theme.level_style(LevelKind::Error)
        } else {
            theme.text_primary_style()
        };
        vec![
            Span::styled("Total: ", theme.text_muted_style()),
            Span::styled(counters.total.to_string(), theme.text_primary_style().add_modifier(Modifier::BOLD)),
            Span::styled(SEPARATOR, theme.text_muted_style()),
            Span::styled("Errors: ", theme.text_muted_style()),
            Span::styled(counters.errors.to_string(), errors_style.add_modifier(Modifier::BOLD)),
        ]
    }

    pub(crate) fn build_line(app: &App, now: Instant) -> Line<'_> {
        let theme = &*app.ctx.theme;
        let mut spans = Self::badge_spans(theme, &app.connection, now);
        spans.push(Span::styled(SEPARATOR, theme.text_muted_style()));
        spans.extend(Self::counter_spans(theme, app.logs.counters()));
        spans.push(Span::styled(SEPARATOR, theme.text_muted_style()));
        spans.push(Span::styled(app.ctx.config.server.as_str(), theme.source_style()));
        Line::from(spans)
    }
}

impl Component for HeaderComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let block = th::block(theme, Some("Logtide"), false);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        frame.render_widget(Paragraph::new(Self::build_line(app, Instant::now())), inner);
    }
}
