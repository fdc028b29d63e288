//! Search bar text entry.
//!
//! While active the bar swallows every key. Enter or Esc ends entry and hands the
//! query, untouched, to the controller as the new filter.

use super::theme::{colors, Styles};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

/// Active flag and query text. The query is never cleared implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

/// What the search bar did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Bar inactive; the key belongs to someone else
    Ignored,
    /// Key consumed, query possibly edited
    Consumed { changed: bool },
    /// Entry finished; carries the final query verbatim
    Submitted(String),
}

#[derive(Debug, Clone, Default)]
pub struct SearchBar {
    state: SearchState,
}

impl SearchBar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.active
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.state.query
    }

    #[must_use]
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    /// Switch text entry on or off without touching the query.
    pub fn toggle_active(&mut self, active: bool) {
        self.state.active = active;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> SearchOutcome {
        if !self.state.active {
            return SearchOutcome::Ignored;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.state.active = false;
                SearchOutcome::Submitted(self.state.query.clone())
            }
            KeyCode::Backspace => SearchOutcome::Consumed {
                changed: self.state.query.pop().is_some(),
            },
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let changed = !self.state.query.is_empty();
                self.state.query.clear();
                SearchOutcome::Consumed { changed }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.state.query.push(c);
                SearchOutcome::Consumed { changed: true }
            }
            _ => SearchOutcome::Consumed { changed: false },
        }
    }

    /// Single-line rendering for the search row.
    #[must_use]
    pub fn line(&self, key_hint: &str) -> Line<'static> {
        let scheme = colors();
        if self.state.active {
            Line::from(vec![
                Span::styled(" Search: ", Style::default().fg(scheme.accent).bold()),
                Span::styled(self.state.query.clone(), Styles::text()),
                Span::styled("█", Style::default().fg(scheme.accent)),
            ])
        } else if self.state.query.is_empty() {
            Line::from(Span::styled(
                format!(" Press {key_hint} to filter"),
                Styles::text_muted(),
            ))
        } else {
            Line::from(vec![
                Span::styled(" Filter: ", Styles::text_muted()),
                Span::styled(self.state.query.clone(), Style::default().fg(scheme.highlight)),
            ])
        }
    }
}
