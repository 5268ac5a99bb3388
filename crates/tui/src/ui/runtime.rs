//! Runtime: the event loop that owns the terminal and all UI state.
//!
//! Responsibilities
//! - Own the terminal lifecycle (alternate screen, raw mode, mouse capture).
//! - Start the live stream task and the one-shot history request.
//! - Multiplex terminal input, stream events, history completion, ticks and
//!   Ctrl+C in a single `tokio::select!` loop, so `App` is only ever touched
//!   from this task.
//! - Execute the `Effect`s components return.
//!
//! Smart ticking: a fast interval (100 ms) while a line is highlighted or a
//! reconnect countdown is on screen, a long interval (5 s) otherwise. Frames
//! are drawn only when `App` reports a visible change.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::MouseEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use logtide_api::{ClientError, LogServerClient, ReconnectPolicy, StreamEvent};
use logtide_types::LogRecord;
use logtide_util::ViewerConfig;
use ratatui::{Terminal, prelude::*};
use tokio::task::JoinHandle;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::app::{App, Effect, Msg};
use crate::ui::components::component::Component;
use crate::ui::main_component::MainView;

type Tui = Terminal<CrosstermBackend<Stdout>>;
type HistoryTask = JoinHandle<Result<Vec<LogRecord>, ClientError>>;

const STREAM_CHANNEL_CAPACITY: usize = 1024;
const FAST_TICK: Duration = Duration::from_millis(100);
const IDLE_TICK: Duration = Duration::from_millis(5000);

/// Spawn a dedicated blocking reader that forwards `crossterm` events over a
/// Tokio channel.
///
/// `poll()` and `read()` stay on the same OS thread. Mouse moves are
/// throttled to one per 16 ms.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);

    tokio::task::spawn_blocking(move || {
        let sixteen_ms = Duration::from_millis(16);
        let mut last_mouse_move = Instant::now();
        loop {
            match event::poll(sixteen_ms) {
                Ok(false) => {
                    if sender.is_closed() {
                        break;
                    }
                    continue;
                }
                Ok(true) => {}
                Err(error) => {
                    warn!(%error, "failed to poll terminal events");
                    break;
                }
            }
            match event::read() {
                Ok(event) => {
                    let is_mouse_move = event.as_mouse_event().is_some_and(|e| e.kind == MouseEventKind::Moved);
                    if is_mouse_move {
                        if last_mouse_move.elapsed() < sixteen_ms {
                            continue;
                        }
                        last_mouse_move = Instant::now();
                    }
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "failed to read terminal event");
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Tui, app: &mut App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => main_view.handle_key_events(app, key_event),
        Event::Mouse(mouse_event) => main_view.handle_mouse_events(app, mouse_event),
        Event::Resize(width, height) => main_view.handle_message(app, Msg::Resize(width, height)),
        Event::Key(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Start the one-shot history request when enabled.
fn spawn_history(client: &LogServerClient, config: &ViewerConfig) -> Option<HistoryTask> {
    if !config.load_history {
        debug!("history loading disabled");
        return None;
    }
    let client = client.clone();
    let limit = config.history_limit;
    Some(tokio::spawn(async move { client.fetch_history(limit).await }))
}

fn history_message(joined: Result<Result<Vec<LogRecord>, ClientError>, tokio::task::JoinError>) -> Msg {
    match joined {
        Ok(Ok(records)) => Msg::HistoryLoaded(records),
        Ok(Err(error)) => Msg::HistoryFailed(error.to_string()),
        Err(error) => Msg::HistoryFailed(format!("history task failed: {error}")),
    }
}

/// Process effects; returns true when the viewer should exit.
fn process_effects(effects: Vec<Effect>) -> bool {
    let mut quit = false;
    for effect in effects {
        match effect {
            Effect::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
                    Ok(()) => debug!("copied log line to clipboard"),
                    Err(error) => warn!(%error, "clipboard error"),
                }
            }
            Effect::Quit => quit = true,
        }
    }
    quit
}

/// Entry point for the viewer: validates the server, starts the background
/// tasks, runs the event loop and restores the terminal on exit.
pub async fn run_app(config: ViewerConfig) -> Result<()> {
    let client = LogServerClient::new(&config.server).with_context(|| format!("cannot use server '{}'", config.server))?;
    info!(server = %client.endpoints().base(), stream = %client.endpoints().stream(), "starting viewer");

    let (stream_sender, mut stream_events) = mpsc::channel::<StreamEvent>(STREAM_CHANNEL_CAPACITY);
    let stream_task = client.stream(ReconnectPolicy::fixed(config.reconnect_delay)).spawn(stream_sender);
    let mut history_task = spawn_history(&client, &config);

    let mut app = App::new(config);
    let mut main_view = MainView::new();
    let mut terminal = setup_terminal()?;
    let mut input_receiver = spawn_input_thread();

    let mut current_interval = IDLE_TICK;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(&mut terminal, &mut app, &mut main_view)?;
    app.take_dirty();

    let outcome = loop {
        let target_interval = if app.needs_animation() { FAST_TICK } else { IDLE_TICK };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let effects = tokio::select! {
            maybe_event = input_receiver.recv() => match maybe_event {
                Some(event) => handle_input_event(&mut app, &mut main_view, event),
                // Input reader stopped; shut down cleanly.
                None => break Ok(()),
            },

            Some(event) = stream_events.recv() => main_view.handle_message(&mut app, Msg::Stream(event)),

            joined = async {
                match history_task.as_mut() {
                    Some(task) => Some(task.await),
                    None => None,
                }
            }, if history_task.is_some() => {
                history_task = None;
                match joined {
                    Some(joined) => main_view.handle_message(&mut app, history_message(joined)),
                    None => Vec::new(),
                }
            }

            _ = ticker.tick() => main_view.handle_message(&mut app, Msg::Tick),

            _ = signal::ctrl_c() => break Ok(()),
        };

        if process_effects(effects) {
            break Ok(());
        }
        if app.take_dirty()
            && let Err(error) = render(&mut terminal, &mut app, &mut main_view)
        {
            break Err(error);
        }
    };

    stream_task.abort();
    if let Some(task) = history_task {
        task.abort();
    }
    cleanup_terminal(&mut terminal)?;
    info!("viewer stopped");
    outcome
}
