use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::{
    prelude::*,
    style::Style,
    widgets::Paragraph,
};

use super::components::{Component, HeaderComponent, LogsComponent};
use crate::app::{App, Effect, Msg};

/// Root view: header on top, the log list in the middle, hints at the bottom.
#[derive(Debug, Default)]
pub struct MainView {
    pub header_view: HeaderComponent,
    pub logs_view: LogsComponent,
}

impl MainView {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_preferred_layout(&self, area: Rect) -> Vec<Rect> {
        Layout::vertical([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Logs
            Constraint::Length(1), // Hints
        ])
        .split(area)
        .to_vec()
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        app.update(msg)
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            return vec![Effect::Quit];
        }
        app.mark_dirty();
        self.logs_view.handle_key_events(app, key)
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        app.mark_dirty();
        self.logs_view.handle_mouse_events(app, mouse)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let bg_fill = Paragraph::new("").style(Style::default().bg(app.ctx.theme.roles().background));
        frame.render_widget(bg_fill, area);

        let layout = self.get_preferred_layout(area);
        self.header_view.render(frame, layout[0], app);
        self.logs_view.render(frame, layout[1], app);

        let hint_spans: Vec<Span> = self.get_hint_spans(app);
        let hints_widget = Paragraph::new(Line::from(hint_spans)).style(app.ctx.theme.text_muted_style());
        frame.render_widget(hints_widget, layout[2]);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hint_spans: Vec<Span> = vec![Span::styled("Hints: ", app.ctx.theme.text_muted_style())];
        hint_spans.extend(self.logs_view.get_hint_spans(app));
        hint_spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtide_api::StreamEvent;
    use logtide_types::LogRecord;
    use logtide_util::ViewerConfig;
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn draw(view: &mut MainView, app: &mut App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).expect("terminal");
        terminal.draw(|frame| view.render(frame, frame.area(), app)).expect("draw");
        terminal
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn initial_screen_shows_placeholder_and_disconnected_badge() {
        let mut app = App::new(ViewerConfig::default());
        let mut view = MainView::new();
        let text = screen_text(&draw(&mut view, &mut app));
        assert!(text.contains("Waiting for logs..."), "{text}");
        assert!(text.contains("Disconnected"), "{text}");
        assert!(text.contains("Total: 0"), "{text}");
        assert!(text.contains("Errors: 0"), "{text}");
    }

    #[test]
    fn records_replace_placeholder_and_clear_restores_it() {
        let mut app = App::new(ViewerConfig::default());
        let mut view = MainView::new();
        let record = LogRecord {
            timestamp: "not-a-time".into(),
            level: "warning".into(),
            source: "db-cluster".into(),
            message: "Replica lag".into(),
        };
        view.handle_message(&mut app, Msg::Stream(StreamEvent::Opened));
        view.handle_message(&mut app, Msg::Stream(StreamEvent::Record(record)));
        let text = screen_text(&draw(&mut view, &mut app));
        assert!(!text.contains("Waiting for logs..."), "{text}");
        assert!(text.contains("[not-a-time] WARNING @db-cluster Replica lag"), "{text}");
        assert!(text.contains("● Connected"), "{text}");

        view.handle_key_events(&mut app, key(KeyCode::Char('c')));
        let text = screen_text(&draw(&mut view, &mut app));
        assert!(text.contains("Waiting for logs..."), "{text}");
        assert!(text.contains("Total: 0"), "{text}");
        assert!(text.contains("● Connected"), "{text}");
    }

    #[test]
    fn quit_keys_request_quit() {
        let mut app = App::new(ViewerConfig::default());
        let mut view = MainView::new();
        assert_eq!(view.handle_key_events(&mut app, key(KeyCode::Char('q'))), vec![Effect::Quit]);
        assert_eq!(view.handle_key_events(&mut app, key(KeyCode::Esc)), vec![Effect::Quit]);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(view.handle_key_events(&mut app, ctrl_c), vec![Effect::Quit]);
    }

    #[test]
    fn copy_emits_the_selected_line() {
        let mut app = App::new(ViewerConfig::default());
        let mut view = MainView::new();
        let record = LogRecord {
            timestamp: "raw".into(),
            level: "info".into(),
            source: "auth-service".into(),
            message: "User login".into(),
        };
        view.handle_message(&mut app, Msg::Stream(StreamEvent::Record(record)));
        assert!(view.handle_key_events(&mut app, key(KeyCode::Char('y'))).is_empty());
        view.handle_key_events(&mut app, key(KeyCode::Down));
        assert_eq!(
            view.handle_key_events(&mut app, key(KeyCode::Char('y'))),
            vec![Effect::CopyToClipboard("[raw] INFO @auth-service User login".into())]
        );
    }
}
