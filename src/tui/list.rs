//! Scrollable cursor view over the flattened tree.

use super::state::ListNavigation;
use super::theme::{colors, Styles};
use super::tree::{NodeId, NodeKind, NodeTree};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// A flattened tree row captured at the last refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: NodeId,
    pub depth: usize,
    pub label: String,
    pub path: Vec<String>,
    pub kind: NodeKind,
    pub has_children: bool,
    pub expanded: bool,
}

impl VisibleRow {
    fn marker(&self) -> &'static str {
        match (self.has_children, self.expanded) {
            (true, true) => "▾ ",
            (true, false) => "▸ ",
            (false, _) => "· ",
        }
    }

    /// Indented text for this row, before truncation.
    #[must_use]
    pub fn text(&self) -> String {
        format!("{}{}{}", "  ".repeat(self.depth), self.marker(), self.label)
    }
}

/// One rendered row: text already fitted to the width, and whether the cursor is on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub text: String,
    pub is_cursor: bool,
    pub kind: Option<NodeKind>,
}

#[derive(Debug, Clone, Default)]
pub struct ListView {
    width: u16,
    height: u16,
    scroll_offset: usize,
    cursor: Option<usize>,
    rows: Vec<VisibleRow>,
}

impl ListView {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    #[must_use]
    pub fn rows(&self) -> &[VisibleRow] {
        &self.rows
    }

    /// Change the viewport. The cursor stays where it is; only scrolling adapts.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.follow_cursor();
    }

    /// Re-flatten the tree and clamp the cursor into the new row range.
    pub fn refresh(&mut self, tree: &NodeTree) {
        self.rows = tree
            .flatten()
            .into_iter()
            .filter_map(|v| {
                let node = tree.get(v.id)?;
                Some(VisibleRow {
                    id: v.id,
                    depth: v.depth,
                    label: node.label.clone(),
                    path: node.path.clone(),
                    kind: node.kind,
                    has_children: !node.is_leaf(),
                    expanded: node.expanded,
                })
            })
            .collect();

        self.cursor = match (self.rows.len(), self.cursor) {
            (0, _) => None,
            (len, Some(c)) => Some(c.min(len - 1)),
            (_, None) => Some(0),
        };
        self.follow_cursor();
    }

    /// Move the cursor by `delta` rows, clamped at both ends. Returns true if it moved.
    pub fn move_cursor(&mut self, delta: isize) -> bool {
        let before = self.cursor;
        self.select_by(delta);
        before != self.cursor
    }

    /// Put the cursor on the first row.
    pub fn reset_cursor(&mut self) {
        self.cursor = if self.rows.is_empty() { None } else { Some(0) };
        self.scroll_offset = 0;
    }

    #[must_use]
    pub fn current(&self) -> Option<&VisibleRow> {
        self.cursor.and_then(|c| self.rows.get(c))
    }

    #[must_use]
    pub fn current_node(&self) -> Option<NodeId> {
        self.current().map(|r| r.id)
    }

    /// Navigation keys. Returns true if the cursor moved.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        let before = self.cursor;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::Home | KeyCode::Char('g') => self.go_first(),
            KeyCode::End | KeyCode::Char('G') => self.go_last(),
            _ => return false,
        }
        before != self.cursor
    }

    fn follow_cursor(&mut self) {
        let height = usize::from(self.height).max(1);
        let Some(cursor) = self.cursor else {
            self.scroll_offset = 0;
            return;
        };
        if cursor < self.scroll_offset {
            self.scroll_offset = cursor;
        } else if cursor >= self.scroll_offset + height {
            self.scroll_offset = cursor + 1 - height;
        }
        let max_offset = self.rows.len().saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    /// Exactly `height` rows: the visible window, padded with blanks.
    #[must_use]
    pub fn render_rows(&self) -> Vec<RenderedRow> {
        let height = usize::from(self.height);
        let width = usize::from(self.width);
        (0..height)
            .map(|i| {
                let index = self.scroll_offset + i;
                match self.rows.get(index) {
                    Some(row) => RenderedRow {
                        text: truncate(&row.text(), width),
                        is_cursor: self.cursor == Some(index),
                        kind: Some(row.kind),
                    },
                    None => RenderedRow {
                        text: String::new(),
                        is_cursor: false,
                        kind: None,
                    },
                }
            })
            .collect()
    }

    /// Styled lines for the tree pane.
    #[must_use]
    pub fn lines(&self) -> Vec<Line<'static>> {
        let scheme = colors();
        self.render_rows()
            .into_iter()
            .map(|row| {
                let style = if row.is_cursor {
                    Styles::selected()
                } else {
                    match row.kind {
                        Some(NodeKind::Category) => Style::default().fg(scheme.category).bold(),
                        Some(NodeKind::Field) => Style::default().fg(scheme.field),
                        _ => Style::default().fg(scheme.entity),
                    }
                };
                Line::styled(row.text, style)
            })
            .collect()
    }
}

impl ListNavigation for ListView {
    fn selected(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    fn set_selected(&mut self, idx: usize) {
        if self.rows.is_empty() {
            self.cursor = None;
            return;
        }
        self.cursor = Some(idx.min(self.rows.len() - 1));
        self.follow_cursor();
    }

    fn total(&self) -> usize {
        self.rows.len()
    }
}

/// Cut `text` to `width` display columns, ending with an ellipsis when shortened.
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    out
}
