use std::collections::VecDeque;
use std::time::{Duration, Instant};

use logtide_types::{LevelKind, LogRecord};
use logtide_util::{display_time, sanitize_for_terminal};
use ratatui::widgets::ListState;

/// Text shown while no record has been rendered since the last clear.
pub const PLACEHOLDER: &str = "Waiting for logs...";

/// Running totals since the last clear. Never capped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogCounters {
    pub total: u64,
    pub errors: u64,
}

impl LogCounters {
    fn record(&mut self, kind: LevelKind) {
        self.total += 1;
        if kind.is_error() {
            self.errors += 1;
        }
    }
}

/// A record prepared for display: sanitized text plus styling inputs.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub kind: LevelKind,
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
    /// The line is drawn with the flash background until this instant.
    pub highlight_until: Option<Instant>,
}

impl LogLine {
    fn new(record: &LogRecord, highlight_until: Instant) -> Self {
        Self {
            kind: record.level_kind(),
            time: display_time(&record.timestamp),
            level: sanitize_for_terminal(&record.level_label()).into_owned(),
            source: format!("@{}", sanitize_for_terminal(&record.source)),
            message: sanitize_for_terminal(&record.message).into_owned(),
            highlight_until: Some(highlight_until),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight_until.is_some()
    }

    /// Plain single-line rendering used for clipboard copy.
    pub fn plain_text(&self) -> String {
        format!("[{}] {} {} {}", self.time, self.level, self.source, self.message)
    }
}

/// Bounded, newest-first list of rendered log lines and its counters.
#[derive(Debug)]
pub struct LogsState {
    lines: VecDeque<LogLine>,
    capacity: usize,
    highlight: Duration,
    counters: LogCounters,
    pub list_state: ListState,
}

impl LogsState {
    pub fn new(capacity: usize, highlight: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity + 1),
            capacity,
            highlight,
            counters: LogCounters::default(),
            list_state: ListState::default(),
        }
    }

    /// Render one record at the top of the list.
    ///
    /// Counts it, flashes it for the highlight duration and drops the oldest
    /// line when the list grows past capacity.
    pub fn push(&mut self, record: LogRecord, now: Instant) {
        let line = LogLine::new(&record, now + self.highlight);
        self.counters.record(line.kind);
        self.lines.push_front(line);
        if let Some(selected) = self.list_state.selected() {
            self.list_state.select(Some(selected + 1));
            *self.list_state.offset_mut() += 1;
        }
        if self.lines.len() > self.capacity {
            self.lines.pop_back();
            if let Some(selected) = self.list_state.selected() {
                self.list_state.select(Some(selected.min(self.capacity - 1)));
            }
        }
    }

    /// Replace everything with the placeholder and zero both counters.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.counters = LogCounters::default();
        self.list_state = ListState::default();
    }

    /// Drop highlights that have run out. Returns true if any changed.
    pub fn expire_highlights(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for line in self.lines.iter_mut() {
            if line.highlight_until.is_some_and(|until| until <= now) {
                line.highlight_until = None;
                changed = true;
            }
        }
        changed
    }

    pub fn has_highlights(&self) -> bool {
        self.lines.iter().any(LogLine::is_highlighted)
    }

    pub fn counters(&self) -> LogCounters {
        self.counters
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn lines(&self) -> &VecDeque<LogLine> {
        &self.lines
    }

    /// Lines and list state borrowed together for stateful rendering.
    pub fn render_parts(&mut self) -> (&VecDeque<LogLine>, &mut ListState) {
        (&self.lines, &mut self.list_state)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The placeholder is shown until the first record after a clear.
    pub fn shows_placeholder(&self) -> bool {
        self.is_empty()
    }

    pub fn selected_line(&self) -> Option<&LogLine> {
        self.list_state.selected().and_then(|index| self.lines.get(index))
    }

    pub fn select_next(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let next = match self.list_state.selected() {
            Some(index) => (index + 1).min(self.lines.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let previous = self.list_state.selected().map_or(0, |index| index.saturating_sub(1));
        self.list_state.select(Some(previous));
    }

    pub fn select_first(&mut self) {
        if !self.lines.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.lines.is_empty() {
            self.list_state.select(Some(self.lines.len() - 1));
        }
    }

    pub fn page_down(&mut self, rows: usize) {
        for _ in 0..rows {
            self.select_next();
        }
    }

    pub fn page_up(&mut self, rows: usize) {
        for _ in 0..rows {
            self.select_previous();
        }
    }

    /// Drop the selection so the newest line stays in view.
    pub fn follow(&mut self) {
        self.list_state = ListState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: &str, message: &str) -> LogRecord {
        LogRecord {
            timestamp: "2024-03-01T10:00:00".into(),
            level: level.into(),
            source: "auth-service".into(),
            message: message.into(),
        }
    }

    fn state() -> LogsState {
        LogsState::new(100, Duration::from_secs(1))
    }

    #[test]
    fn starts_with_placeholder_and_zero_counters() {
        let logs = state();
        assert!(logs.shows_placeholder());
        assert_eq!(logs.counters(), LogCounters::default());
    }

    #[test]
    fn first_record_replaces_placeholder() {
        let mut logs = state();
        logs.push(record("info", "hello"), Instant::now());
        assert!(!logs.shows_placeholder());
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn counters_track_totals_and_errors_case_insensitively() {
        let mut logs = state();
        let now = Instant::now();
        for level in ["info", "ERROR", "warning", "Error", "error", "DEBUG"] {
            logs.push(record(level, "m"), now);
        }
        assert_eq!(logs.counters(), LogCounters { total: 6, errors: 3 });
    }

    #[test]
    fn newest_line_is_on_top() {
        let mut logs = state();
        let now = Instant::now();
        logs.push(record("info", "older"), now);
        logs.push(record("info", "newer"), now);
        assert_eq!(logs.lines()[0].message, "newer");
        assert_eq!(logs.lines()[1].message, "older");
    }

    #[test]
    fn list_never_exceeds_capacity_but_counters_keep_counting() {
        let mut logs = state();
        let now = Instant::now();
        for index in 0..100 {
            logs.push(record("info", &format!("m{index}")), now);
        }
        assert_eq!(logs.len(), 100);
        assert_eq!(logs.lines().back().map(|line| line.message.as_str()), Some("m0"));

        logs.push(record("error", "m100"), now);
        assert_eq!(logs.len(), 100);
        assert_eq!(logs.lines().front().map(|line| line.message.as_str()), Some("m100"));
        assert_eq!(logs.lines().back().map(|line| line.message.as_str()), Some("m1"));

        for index in 101..350 {
            logs.push(record("info", &format!("m{index}")), now);
        }
        assert_eq!(logs.len(), 100);
        assert_eq!(logs.counters(), LogCounters { total: 350, errors: 1 });
    }

    #[test]
    fn clear_resets_everything_to_placeholder() {
        let mut logs = state();
        let now = Instant::now();
        for level in ["error", "info", "error"] {
            logs.push(record(level, "m"), now);
        }
        logs.select_next();
        logs.clear();
        assert!(logs.shows_placeholder());
        assert_eq!(logs.counters(), LogCounters { total: 0, errors: 0 });
        assert!(logs.selected_line().is_none());

        logs.push(record("error", "again"), now);
        assert_eq!(logs.counters(), LogCounters { total: 1, errors: 1 });
    }

    #[test]
    fn highlight_expires_after_its_duration() {
        let mut logs = state();
        let now = Instant::now();
        logs.push(record("info", "flash"), now);
        assert!(logs.has_highlights());
        assert!(!logs.expire_highlights(now + Duration::from_millis(999)));
        assert!(logs.has_highlights());
        assert!(logs.expire_highlights(now + Duration::from_secs(1)));
        assert!(!logs.has_highlights());
    }

    #[test]
    fn line_formats_level_source_and_message() {
        let mut logs = state();
        logs.push(record("warning", "disk low"), Instant::now());
        let line = &logs.lines()[0];
        assert_eq!(line.level, "WARNING");
        assert_eq!(line.source, "@auth-service");
        assert_eq!(line.kind, LevelKind::Warning);
        assert!(line.plain_text().ends_with("WARNING @auth-service disk low"));
    }

    #[test]
    fn hostile_content_is_neutralized() {
        let mut logs = state();
        let mut hostile = record("info", "\u{1b}[2Jcleared\nsecond line");
        hostile.source = "<script>alert(1)</script>".into();
        logs.push(hostile, Instant::now());
        let line = &logs.lines()[0];
        assert!(!line.message.chars().any(char::is_control));
        assert_eq!(line.source, "@<script>alert(1)</script>");
        assert!(line.message.ends_with("[2Jcleared second line"));
    }

    #[test]
    fn hostile_timestamp_is_neutralized() {
        let mut logs = state();
        let mut hostile = record("info", "m");
        hostile.timestamp = "\u{1b}[31mred".into();
        logs.push(hostile, Instant::now());
        let line = &logs.lines()[0];
        assert_eq!(line.time, "\u{FFFD}[31mred");
        assert!(!line.plain_text().chars().any(char::is_control));
    }

    #[test]
    fn selection_sticks_to_the_same_line_as_new_lines_arrive() {
        let mut logs = state();
        let now = Instant::now();
        logs.push(record("info", "a"), now);
        logs.push(record("info", "b"), now);
        logs.select_first();
        assert_eq!(logs.selected_line().map(|line| line.message.as_str()), Some("b"));
        logs.push(record("info", "c"), now);
        assert_eq!(logs.selected_line().map(|line| line.message.as_str()), Some("b"));
    }

    #[test]
    fn navigation_is_bounded() {
        let mut logs = state();
        let now = Instant::now();
        logs.select_next();
        assert!(logs.selected_line().is_none());
        for message in ["a", "b", "c"] {
            logs.push(record("info", message), now);
        }
        logs.page_down(10);
        assert_eq!(logs.selected_line().map(|line| line.message.as_str()), Some("a"));
        logs.page_up(10);
        assert_eq!(logs.selected_line().map(|line| line.message.as_str()), Some("c"));
        logs.select_last();
        assert_eq!(logs.list_state.selected(), Some(2));
        logs.follow();
        assert!(logs.list_state.selected().is_none());
    }
}
