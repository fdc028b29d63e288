//! Terminal setup, the main loop and frame rendering.

use super::controller::{Controller, Mode};
use super::events::{Event, EventHandler};
use super::scheduler::Scheduler;
use super::status::NoticeLevel;
use super::theme::{colors, render_footer_hints, Styles};
use super::widgets::{check_terminal_size, render_help_popup, render_size_warning};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::io::{self, stdout};
use tracing::{debug, info};

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠸", "⠴"];

/// Run the TUI until the controller asks to quit.
///
/// Tasks returned by the controller are handed to `scheduler`; their results come
/// back through `events`. The terminal is restored even when the loop fails.
pub fn run_tui(
    controller: &mut Controller,
    scheduler: &Scheduler,
    events: &EventHandler,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, controller, scheduler, events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut Controller,
    scheduler: &Scheduler,
    events: &EventHandler,
) -> io::Result<()> {
    // Size the panes before the first frame
    let size = terminal.size()?;
    controller.handle_event(Event::Resize(size.width, size.height));
    info!(width = size.width, height = size.height, "ui started");

    loop {
        terminal.draw(|frame| render(frame, controller))?;

        let event = events.next()?;
        let tasks = controller.handle_event(event);
        if !tasks.is_empty() {
            debug!(count = tasks.len(), "dispatching tasks");
            scheduler.submit_all(tasks);
        }

        if controller.should_quit() {
            break;
        }
    }
    Ok(())
}

/// Main render function
pub fn render(frame: &mut Frame, controller: &Controller) {
    let area = frame.area();

    if check_terminal_size(area.width, area.height).is_err() {
        render_size_warning(frame, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(1), // Search bar
            Constraint::Min(3),    // Panes
            Constraint::Length(1), // Status
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], controller);
    frame.render_widget(
        Paragraph::new(
            controller
                .search()
                .line(&controller.keymap().search.hint),
        ),
        chunks[1],
    );
    render_panes(frame, chunks[2], controller);
    render_status(frame, chunks[3], controller);
    render_footer(frame, chunks[4], controller);

    if controller.show_help() {
        render_help_popup(frame, area, controller.keymap());
    }
}

fn render_header(frame: &mut Frame, area: Rect, controller: &Controller) {
    let mut spans = vec![
        Span::styled("cql-tui", Styles::header_title()),
        Span::styled(" │ ", Style::default().fg(colors().muted)),
        Span::styled("keyspace ", Styles::text_muted()),
        Span::styled(
            controller.keyspace().to_string(),
            Style::default().fg(colors().text).bold(),
        ),
        Span::styled(" │ ", Style::default().fg(colors().muted)),
        Span::styled(controller.addresses().join(", "), Styles::text_muted()),
    ];
    if controller.scanning() {
        let frame_idx = (controller.tick() % SPINNER.len() as u64) as usize;
        spans.push(Span::styled(
            format!("  {} scanning", SPINNER[frame_idx]),
            Styles::warning(),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Styles::border()),
    );
    frame.render_widget(header, area);
}

fn render_panes(frame: &mut Frame, area: Rect, controller: &Controller) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area);

    let tree_border = if controller.mode() == Mode::Normal {
        Styles::border_focused()
    } else {
        Styles::border()
    };
    let tree = Paragraph::new(controller.list().lines()).block(
        Block::default()
            .title(" Schema ")
            .borders(Borders::ALL)
            .border_style(tree_border),
    );
    frame.render_widget(tree, halves[0]);

    let details = controller.details();
    let title = if details.pretty() {
        details.title()
    } else {
        format!("{}(raw) ", details.title())
    };
    let pane = Paragraph::new(details.lines()).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Styles::border()),
    );
    frame.render_widget(pane, halves[1]);
}

fn render_status(frame: &mut Frame, area: Rect, controller: &Controller) {
    let line = match controller.status().current() {
        Some((NoticeLevel::Error, msg)) => Line::styled(format!(" {msg}"), Styles::error()),
        Some((NoticeLevel::Info, msg)) => Line::styled(format!(" {msg}"), Styles::success()),
        None => {
            let list = controller.list();
            let position = list.cursor().map_or(0, |c| c + 1);
            let mut spans = vec![
                Span::styled(" Row ", Styles::text_muted()),
                Span::styled(
                    format!("{position}/{}", list.rows().len()),
                    Style::default().fg(colors().primary).bold(),
                ),
            ];
            if !controller.filter().is_empty() {
                spans.push(Span::styled(" │ filter ", Styles::text_muted()));
                spans.push(Span::styled(
                    controller.filter().to_string(),
                    Style::default().fg(colors().highlight),
                ));
            }
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line).style(Styles::status_bar()), area);
}

fn render_footer(frame: &mut Frame, area: Rect, controller: &Controller) {
    let keymap = controller.keymap();
    let hints = [
        (keymap.quit.hint.clone(), "quit"),
        (keymap.search.hint.clone(), "search"),
        (keymap.enter.hint.clone(), "open"),
        (keymap.scan.hint.clone(), "rescan"),
        (keymap.help.hint.clone(), "help"),
    ];
    frame.render_widget(Paragraph::new(Line::from(render_footer_hints(&hints))), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeyBindings, Keymap};
    use crate::tui::scanner::ScanEntry;
    use ratatui::backend::TestBackend;

    fn controller() -> Controller {
        let keymap = Keymap::from_bindings(&KeyBindings::default()).unwrap();
        let mut c = Controller::new("shop".into(), vec!["10.0.0.1:9042".into()], keymap, true);
        c.handle_event(Event::Resize(80, 20));
        c.handle_event(Event::ScanFinished {
            generation: 0,
            result: Ok(vec![ScanEntry {
                parents: Vec::new(),
                label: "Tables".into(),
            }]),
        });
        c
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_render_shows_header_and_tree() {
        let c = controller();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, &c)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("keyspace shop"));
        assert!(text.contains("10.0.0.1:9042"));
        assert!(text.contains("· Tables"));
        assert!(text.contains("[q]quit"));
    }

    #[test]
    fn test_render_small_terminal_warns() {
        let c = controller();
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|frame| render(frame, &c)).unwrap();
        assert!(buffer_text(&terminal).contains("Terminal too small"));
    }
}
