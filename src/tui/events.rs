//! Event handling for the TUI.
//!
//! Terminal input and background task results share one queue. The loop polls
//! crossterm in short slices and drains the task channel in between, so results
//! are applied on the UI thread in arrival order.

use super::details::SelectionTag;
use super::scanner::ScanEntry;
use crate::error::Result;
use crate::metadata::DetailRow;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

const POLL_SLICE: Duration = Duration::from_millis(25);

/// Application event
#[derive(Debug)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Resize event
    Resize(u16, u16),
    /// Periodic tick (status expiry, spinner)
    Tick,
    /// A metadata scan finished
    ScanFinished {
        generation: u64,
        result: Result<Vec<ScanEntry>>,
    },
    /// Rows for a selected entity arrived
    DetailsFetched {
        tag: SelectionTag,
        result: Result<Vec<DetailRow>>,
    },
    /// The committed search filter changed
    FilterChanged(String),
}

/// Event handler
pub struct EventHandler {
    tick_rate: Duration,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl EventHandler {
    /// Create a new event handler
    #[must_use]
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
            tx,
            rx,
        }
    }

    /// Sender for background tasks to post results on.
    #[must_use]
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Block until the next event, yielding `Tick` when the tick rate elapses.
    pub fn next(&self) -> std::io::Result<Event> {
        let deadline = Instant::now() + self.tick_rate;
        loop {
            match self.rx.try_recv() {
                Ok(ev) => return Ok(ev),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {}
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(Event::Tick);
            }
            if event::poll(remaining.min(POLL_SLICE))? {
                if let Some(ev) = map_terminal_event(event::read()?) {
                    return Ok(ev);
                }
            }
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(250)
    }
}

/// Translate a crossterm event; key releases and repeats are dropped.
fn map_terminal_event(ev: CrosstermEvent) -> Option<Event> {
    match ev {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn test_only_key_presses_forwarded() {
        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(matches!(
            map_terminal_event(CrosstermEvent::Key(press)),
            Some(Event::Key(_))
        ));

        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(map_terminal_event(CrosstermEvent::Key(release)).is_none());
        assert!(matches!(
            map_terminal_event(CrosstermEvent::Resize(100, 40)),
            Some(Event::Resize(100, 40))
        ));
        assert!(map_terminal_event(CrosstermEvent::FocusGained).is_none());
    }

    #[test]
    fn test_queued_results_come_first() {
        let handler = EventHandler::new(10);
        handler
            .sender()
            .send(Event::FilterChanged("x".into()))
            .unwrap();
        assert!(matches!(handler.next(), Ok(Event::FilterChanged(f)) if f == "x"));
    }
}
