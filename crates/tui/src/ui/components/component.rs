//! Component system for the Logtide viewer.
//!
//! Components are self-contained UI regions. They read and mutate the shared
//! [`App`] state in their event handlers, draw themselves into the `Rect`
//! they are given, and report side effects back to the runtime as
//! [`Effect`]s instead of performing them directly.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{Frame, layout::Rect, text::Span};

use crate::app::{App, Effect, Msg};

/// A UI region with its own rendering and input handling.
///
/// # Lifecycle
///
/// 1. Application messages arrive through `handle_message()`
/// 2. Input arrives through `handle_key_events()` and `handle_mouse_events()`
/// 3. `render()` draws the component into the frame area it was assigned
pub(crate) trait Component {
    /// Handle an application-level message the component cares about.
    fn handle_message(&mut self, _app: &mut App, _msg: Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle a key press routed to this component.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle a mouse event. Components check their own hit area.
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Draw the component into `rect`.
    ///
    /// Implementations may record layout (hit areas) but should leave
    /// application state changes to the event handlers.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);

    /// Key hints shown in the hint bar while this component is active.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        Vec::new()
    }
}
