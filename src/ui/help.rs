//! Help overlay rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the help overlay
pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    // Calculate overlay size (60% width, 70% height, centered)
    let overlay_width = (area.width as f32 * 0.7).min(70.0) as u16;
    let overlay_height = (area.height as f32 * 0.8).min(30.0) as u16;

    let overlay_area = centered_rect(overlay_width, overlay_height, area);

    // Clear background
    frame.render_widget(Clear, overlay_area);

    // Render help content
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let help_text = create_help_text();
    let widget = Paragraph::new(help_text).style(Style::default().fg(Color::White));

    frame.render_widget(widget, inner);
}

/// Create help text content
fn create_help_text() -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for (section, bindings) in HELP_SECTIONS {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(*section, section_style)));
        lines.extend(bindings.iter().map(|(key, desc)| binding_line(key, desc)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "       [Press ? or Esc to close]",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

type Section = (&'static str, &'static [(&'static str, &'static str)]);

const HELP_SECTIONS: &[Section] = &[
    (
        "Global",
        &[
            ("Q", "Quit application"),
            ("?", "Toggle help overlay"),
            ("Tab", "Switch between controls and preview"),
            ("1, 2, 3", "Telegram Android / Telegram iOS / VK"),
            ("E", "Export PNG (1125×2001)"),
            ("C", "Copy last export to clipboard"),
            ("Z", "Toggle preview zoom"),
        ],
    ),
    (
        "Controls",
        &[
            ("↑ ↓", "Select row"),
            ("← →", "Change style"),
            ("Enter", "Edit field / activate row"),
            ("Space", "Toggle read receipt"),
        ],
    ),
    (
        "While editing",
        &[
            ("Enter", "New line (message) / finish"),
            ("Alt+Enter", "Finish message"),
            ("Esc", "Finish editing"),
        ],
    ),
];

fn binding_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Green)),
        Span::styled(desc, Style::default().fg(Color::White)),
    ])
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal_padding = area.width.saturating_sub(width) / 2;
    let vertical_padding = area.height.saturating_sub(height) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(vertical_padding),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(horizontal_padding),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}
