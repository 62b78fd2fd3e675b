//! Terminal input for the desktop.
//!
//! Crossterm events are read on a blocking thread and queued; the UI loop drains
//! the queue once per frame and maps each event onto the shell.

use anyhow::{Result, anyhow};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use mks_engine::{Key, KeyInput, Point, Shell};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    /// Start reading terminal events. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Unblock the reader if it is waiting on channel capacity.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Apply queued terminal events to `shell`. Stops early once the shell terminates.
pub fn handle_events(shell: &mut Shell, input: &mut InputPump) -> Result<()> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME && !shell.is_terminated() {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };
        apply_event(shell, ev);
        processed += 1;
    }
    Ok(())
}

/// Route one terminal event to the shell.
pub fn apply_event(shell: &mut Shell, ev: Event) {
    match ev {
        Event::Key(key) => {
            if let Some(input) = map_key(key) {
                shell.handle_key(input);
            }
        }
        Event::Mouse(mouse) => {
            if let Some(point) = map_click(mouse) {
                shell.handle_click(point);
            }
        }
        Event::Resize(width, height) => {
            debug!(width, height, "Terminal resized");
            shell.set_viewport(width, height);
        }
        _ => {}
    }
}

/// Key presses the shell understands. Releases and unmapped keys give `None`.
#[must_use]
pub fn map_key(key: KeyEvent) -> Option<KeyInput> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let mapped = match key.code {
        KeyCode::Char(c) if ctrl => Key::Char(c.to_ascii_lowercase()),
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab => Key::Tab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    };
    Some(KeyInput { key: mapped, ctrl })
}

/// Left-button presses become clicks; everything else is ignored.
#[must_use]
pub fn map_click(mouse: MouseEvent) -> Option<Point> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Point::new(mouse.column, mouse.row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn plain_keys_map_through() {
        assert_eq!(
            map_key(press(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(KeyInput::plain(Key::Char('a')))
        );
        assert_eq!(
            map_key(press(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(KeyInput::plain(Key::Char('A')))
        );
        assert_eq!(
            map_key(press(KeyCode::F(10), KeyModifiers::NONE)),
            Some(KeyInput::plain(Key::F(10)))
        );
        assert_eq!(
            map_key(press(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(KeyInput::plain(Key::Backspace))
        );
    }

    #[test]
    fn control_chords_are_lowercased() {
        let input = map_key(press(KeyCode::Char('Q'), KeyModifiers::CONTROL)).unwrap();
        assert_eq!(input, KeyInput::ctrl('q'));
        assert!(input.is_ctrl('q'));
    }

    #[test]
    fn releases_and_unknown_keys_are_dropped() {
        let release = KeyEvent {
            code: KeyCode::Char('x'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key(release), None);
        assert_eq!(map_key(press(KeyCode::Home, KeyModifiers::NONE)), None);
    }

    #[test]
    fn only_left_presses_are_clicks() {
        assert_eq!(
            map_click(mouse(MouseEventKind::Down(MouseButton::Left), 4, 7)),
            Some(Point::new(4, 7))
        );
        assert_eq!(
            map_click(mouse(MouseEventKind::Down(MouseButton::Right), 4, 7)),
            None
        );
        assert_eq!(
            map_click(mouse(MouseEventKind::Up(MouseButton::Left), 4, 7)),
            None
        );
        assert_eq!(map_click(mouse(MouseEventKind::Moved, 4, 7)), None);
    }
}
