//! Shared widgets: size guard, popups and the keybinding help.

use super::theme::{colors, Styles};
use crate::config::Keymap;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 15;

/// Check if terminal meets minimum size requirements.
pub const fn check_terminal_size(width: u16, height: u16) -> Result<(), (u16, u16)> {
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        Err((MIN_WIDTH, MIN_HEIGHT))
    } else {
        Ok(())
    }
}

/// Render a "terminal too small" message.
pub fn render_size_warning(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::styled(
            "Terminal too small",
            Style::default().fg(colors().warning).bold(),
        ),
        Line::from(""),
        Line::from(vec![
            Span::raw("Current: "),
            Span::styled(format!("{}x{}", area.width, area.height), Styles::text()),
        ]),
        Line::from(vec![
            Span::raw("Required: "),
            Span::styled(format!("{MIN_WIDTH}x{MIN_HEIGHT}"), Styles::label()),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::warning()),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Full keybinding list, configured labels first.
#[must_use]
pub fn help_lines(keymap: &Keymap) -> Vec<(String, &'static str)> {
    vec![
        (keymap.quit.hint.clone(), "Quit"),
        (keymap.search.hint.clone(), "Search (Enter/Esc to apply)"),
        (keymap.enter.hint.clone(), "Expand/collapse or open details"),
        (keymap.scan.hint.clone(), "Rescan keyspace"),
        (keymap.help.hint.clone(), "Toggle this help"),
        (keymap.theme.hint.clone(), "Cycle theme"),
        ("↑/↓ j/k".to_string(), "Move cursor"),
        ("PgUp/PgDn".to_string(), "Move one page"),
        ("Home/End".to_string(), "First/last row"),
        ("ctrl+d/ctrl+u".to_string(), "Scroll details half a page"),
        ("J/K".to_string(), "Scroll details one line"),
        ("p".to_string(), "Toggle JSON pretty-print"),
    ]
}

pub fn render_help_popup(frame: &mut Frame, area: Rect, keymap: &Keymap) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::styled(
            "━━━ Keyboard Shortcuts ━━━",
            Style::default().fg(colors().accent).bold(),
        ),
        Line::from(""),
    ];
    lines.extend(help_lines(keymap).into_iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(format!("  {key:<16}"), Styles::shortcut_key()),
            Span::styled(desc, Styles::text()),
        ])
    }));

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .title_style(Style::default().fg(colors().primary).bold())
                .borders(Borders::ALL)
                .border_style(Styles::border_focused()),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(popup, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyBindings;

    #[test]
    fn test_size_check() {
        assert!(check_terminal_size(60, 15).is_ok());
        assert_eq!(check_terminal_size(59, 40), Err((MIN_WIDTH, MIN_HEIGHT)));
        assert!(check_terminal_size(120, 14).is_err());
    }

    #[test]
    fn test_help_uses_configured_labels() {
        let keymap = Keymap::from_bindings(&KeyBindings {
            scan: vec!["R".to_string()],
            ..KeyBindings::default()
        })
        .unwrap();
        let lines = help_lines(&keymap);
        assert!(lines.iter().any(|(k, d)| k == "R" && *d == "Rescan keyspace"));
    }

    #[test]
    fn test_centered_rect_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 70, area);
        assert!(popup.right() <= area.right() && popup.bottom() <= area.bottom());
        assert!((55..=65).contains(&popup.width));
        assert!(popup.x > 0 && popup.y > 0);
    }
}
