//! Details pane for the selected entity.
//!
//! Rows are replaced wholesale on each selection. Every fetch is tagged, and a
//! result whose tag is not the latest selection is dropped.

use super::list::truncate;
use super::theme::{colors, Styles};
use crate::metadata::{DetailRow, EntityPath};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use tracing::{debug, trace};

/// Identity of one details request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionTag(pub u64);

/// A detail row with its display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRow {
    pub name: String,
    pub raw: String,
    pub formatted: String,
}

impl FormattedRow {
    fn new(row: DetailRow, pretty: bool) -> Self {
        let formatted = format_value(&row.raw, pretty);
        Self {
            name: row.name,
            raw: row.raw,
            formatted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsState {
    Empty,
    Loading {
        tag: SelectionTag,
        entity: EntityPath,
    },
    Loaded {
        entity: EntityPath,
        rows: Vec<FormattedRow>,
    },
    Failed {
        entity: EntityPath,
        message: String,
    },
}

/// Re-indent `raw` as 4-space JSON when enabled and valid; otherwise return it unchanged.
///
/// Never fails: any parse or serialization problem falls back to the raw text.
#[must_use]
pub fn format_value(raw: &str, pretty: bool) -> String {
    if !pretty {
        return raw.to_string();
    }
    match reindent_json(raw) {
        Ok(out) => out,
        Err(e) => {
            trace!(error = %e, "value is not JSON, showing raw text");
            raw.to_string()
        }
    }
}

fn reindent_json(raw: &str) -> Result<String, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    serde::Serialize::serialize(&value, &mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8(out).unwrap_or_else(|_| raw.to_string()))
}

#[derive(Debug, Clone)]
pub struct DetailsPane {
    width: u16,
    height: u16,
    scroll: usize,
    pretty: bool,
    next_tag: u64,
    state: DetailsState,
}

impl DetailsPane {
    #[must_use]
    pub const fn new(pretty: bool) -> Self {
        Self {
            width: 0,
            height: 0,
            scroll: 0,
            pretty,
            next_tag: 0,
            state: DetailsState::Empty,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &DetailsState {
        &self.state
    }

    #[must_use]
    pub const fn pretty(&self) -> bool {
        self.pretty
    }

    #[must_use]
    pub const fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp_scroll();
    }

    /// Entity currently shown or being fetched.
    #[must_use]
    pub const fn entity(&self) -> Option<&EntityPath> {
        match &self.state {
            DetailsState::Empty => None,
            DetailsState::Loading { entity, .. }
            | DetailsState::Loaded { entity, .. }
            | DetailsState::Failed { entity, .. } => Some(entity),
        }
    }

    /// Start a new selection and return the tag its fetch must carry.
    pub fn begin(&mut self, entity: EntityPath) -> SelectionTag {
        self.next_tag += 1;
        let tag = SelectionTag(self.next_tag);
        self.state = DetailsState::Loading { tag, entity };
        self.scroll = 0;
        tag
    }

    /// Apply a fetch result if it belongs to the pending selection.
    ///
    /// Returns false when the result is stale and was dropped.
    pub fn apply(
        &mut self,
        tag: SelectionTag,
        result: std::result::Result<Vec<DetailRow>, String>,
    ) -> bool {
        let entity = match &self.state {
            DetailsState::Loading { tag: pending, entity } if *pending == tag => entity.clone(),
            _ => {
                debug!(tag = tag.0, "dropping stale details result");
                return false;
            }
        };
        self.state = match result {
            Ok(rows) => DetailsState::Loaded {
                entity,
                rows: rows
                    .into_iter()
                    .map(|r| FormattedRow::new(r, self.pretty))
                    .collect(),
            },
            Err(message) => DetailsState::Failed { entity, message },
        };
        self.scroll = 0;
        true
    }

    /// Forget the current rows and any pending fetch.
    pub fn discard(&mut self) {
        self.state = DetailsState::Empty;
        self.scroll = 0;
    }

    /// Flip JSON pretty-printing and re-format rows already loaded.
    pub fn toggle_pretty(&mut self) {
        self.pretty = !self.pretty;
        let pretty = self.pretty;
        if let DetailsState::Loaded { rows, .. } = &mut self.state {
            for row in rows.iter_mut() {
                row.formatted = format_value(&row.raw, pretty);
            }
        }
        self.clamp_scroll();
    }

    /// Scroll and formatting keys. Returns true on a state change.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let half = usize::from(self.height / 2).max(1);
        let before = (self.scroll, self.pretty);
        match key.code {
            KeyCode::Char('d') if ctrl => self.scroll_by(half as isize),
            KeyCode::Char('u') if ctrl => self.scroll_by(-(half as isize)),
            KeyCode::Char('J') => self.scroll_by(1),
            KeyCode::Char('K') => self.scroll_by(-1),
            KeyCode::Char('p') if !ctrl => self.toggle_pretty(),
            _ => return false,
        }
        before != (self.scroll, self.pretty)
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll = self.scroll.saturating_add_signed(delta);
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        let max = self
            .content_len()
            .saturating_sub(usize::from(self.height).max(1));
        self.scroll = self.scroll.min(max);
    }

    fn content_len(&self) -> usize {
        self.content().len()
    }

    /// Full pane content as (label, text) lines before scrolling.
    fn content(&self) -> Vec<Line<'static>> {
        let width = usize::from(self.width);
        match &self.state {
            DetailsState::Empty => vec![Line::styled(
                "Select a table, view, function, aggregate or type",
                Styles::text_muted(),
            )],
            DetailsState::Loading { entity, .. } => vec![Line::styled(
                format!("Loading {entity}…"),
                Styles::warning(),
            )],
            DetailsState::Failed { message, .. } => vec![
                Line::styled("Failed to load rows", Styles::error().bold()),
                Line::styled(message.clone(), Styles::error()),
            ],
            DetailsState::Loaded { rows, .. } if rows.is_empty() => {
                vec![Line::styled("(no rows)", Styles::text_muted())]
            }
            DetailsState::Loaded { rows, .. } => {
                let mut lines = Vec::new();
                for row in rows {
                    lines.push(Line::styled(truncate(&row.name, width), Styles::label().bold()));
                    for text in row.formatted.lines() {
                        lines.push(Line::styled(
                            truncate(&format!("  {text}"), width),
                            Style::default().fg(colors().text),
                        ));
                    }
                }
                lines
            }
        }
    }

    /// Visible slice of the pane content.
    #[must_use]
    pub fn lines(&self) -> Vec<Line<'static>> {
        self.content()
            .into_iter()
            .skip(self.scroll)
            .take(usize::from(self.height))
            .collect()
    }

    /// Pane title: the open entity, if any.
    #[must_use]
    pub fn title(&self) -> String {
        match self.entity() {
            Some(entity) => format!(" {entity} "),
            None => " Details ".to_string(),
        }
    }
}
