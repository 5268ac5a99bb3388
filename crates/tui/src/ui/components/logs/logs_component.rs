//! Logs component: the bounded, newest-first list of rendered log lines.
//!
//! Each line is `▌ [time] LEVEL @source message`, with the bar and level
//! label colored by severity. Fresh lines are drawn on a flash background
//! until their highlight expires. All record text goes into spans as plain
//! content.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use logtide_util::truncate_with_ellipsis;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use super::state::{LogLine, PLACEHOLDER};
use crate::app::{App, Effect};
use crate::ui::components::component::Component;
use crate::ui::theme::{Theme, theme_helpers as th};

const ACCENT_BAR: &str = "▌";
const PAGE_ROWS: usize = 10;

#[derive(Debug, Default)]
pub struct LogsComponent {
    list_area: Rect,
}

impl LogsComponent {
    fn build_line<'a>(theme: &dyn Theme, line: &'a LogLine, width: usize) -> Line<'a> {
        let mut spans = vec![
            Span::styled(ACCENT_BAR, Style::default().fg(theme.level_color(line.kind))),
            Span::styled(format!("[{}]", line.time), theme.text_muted_style()),
            Span::raw(" "),
            Span::styled(line.level.as_str(), theme.level_style(line.kind)),
            Span::raw(" "),
            Span::styled(line.source.as_str(), theme.source_style()),
            Span::raw(" "),
        ];
        let used: usize = spans.iter().map(Span::width).sum();
        let message = truncate_with_ellipsis(&line.message, width.saturating_sub(used));
        spans.push(Span::styled(message, theme.text_primary_style()));
        Line::from(spans)
    }
}

impl Component for LogsComponent {
    /// ## Keys
    /// - **↑/↓**, **PgUp/PgDn**, **Home/End**: move the selection
    /// - **f**: drop the selection and follow the newest line
    /// - **y**: copy the selected line
    /// - **c**: clear the list and counters
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return effects;
        }
        match key.code {
            KeyCode::Up => app.logs.select_previous(),
            KeyCode::Down => app.logs.select_next(),
            KeyCode::PageUp => app.logs.page_up(PAGE_ROWS),
            KeyCode::PageDown => app.logs.page_down(PAGE_ROWS),
            KeyCode::Home => app.logs.select_first(),
            KeyCode::End => app.logs.select_last(),
            KeyCode::Char('f') => app.logs.follow(),
            KeyCode::Char('c') => app.clear_logs(),
            KeyCode::Char('y') => {
                if let Some(line) = app.logs.selected_line() {
                    effects.push(Effect::CopyToClipboard(line.plain_text()));
                }
            }
            _ => {}
        }
        effects
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let inside = self.list_area.contains((mouse.column, mouse.row).into());
        match mouse.kind {
            MouseEventKind::ScrollDown if inside => app.logs.select_next(),
            MouseEventKind::ScrollUp if inside => app.logs.select_previous(),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let title = format!("Logs ({}/{})", app.logs.len(), app.logs.capacity());
        let block = th::block(theme, Some(&title), true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        self.list_area = inner;

        if app.logs.shows_placeholder() {
            let placeholder = Paragraph::new(Line::from(Span::styled(
                PLACEHOLDER,
                theme.text_muted_style().add_modifier(Modifier::ITALIC),
            )));
            frame.render_widget(placeholder, inner);
            return;
        }

        let width = inner.width.saturating_sub(1) as usize;
        let content_len = app.logs.len();
        let (lines, list_state) = app.logs.render_parts();
        let items: Vec<ListItem> = lines
            .iter()
            .map(|line| {
                let item = ListItem::new(Self::build_line(theme, line, width));
                if line.is_highlighted() { item.style(theme.flash_style()) } else { item }
            })
            .collect();
        let list = List::new(items).highlight_style(theme.selection_style());
        frame.render_stateful_widget(list, inner, list_state);

        let visible = inner.height as usize;
        if visible > 0 && content_len > visible {
            let max_offset = content_len.saturating_sub(visible);
            let mut scrollbar_state = ScrollbarState::new(max_offset)
                .position(list_state.offset().min(max_offset))
                .viewport_content_length(visible);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .thumb_style(Style::default().fg(theme.roles().scrollbar_thumb))
                .track_style(Style::default().fg(theme.roles().scrollbar_track));
            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let theme = &*app.ctx.theme;
        let mut spans = th::build_hint_spans(
            theme,
            &[("↑/↓", " Move  "), ("PgUp/PgDn", " Page  "), ("Home/End", " Jump  "), ("C", " Clear  ")],
        );
        if app.logs.selected_line().is_some() {
            spans.extend(th::build_hint_spans(theme, &[("Y", " Copy  "), ("F", " Follow  ")]));
        }
        spans.extend(th::build_hint_spans(theme, &[("Q", " Quit")]));
        spans
    }
}
