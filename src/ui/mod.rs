//! UI module
//!
//! Contains all UI rendering components using Ratatui.

mod help;
mod preview;
mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::state::{AppState, FocusedWidget};

/// Main render function - draws the entire UI
pub fn render(frame: &mut Frame, state: &AppState) {
    let size = frame.area();

    // Check minimum size
    if size.width < 40 || size.height < 15 {
        render_size_warning(frame, size);
        return;
    }

    // Main layout: title bar, content, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_title_bar(frame, main_chunks[0], state);
    render_main_content(frame, main_chunks[1], state);
    render_status_bar(frame, main_chunks[2], state);

    if state.avatar_prompt_active {
        render_avatar_prompt(frame, size, state);
    }

    // Render help overlay if active
    if state.show_help {
        help::render_help_overlay(frame, size);
    }
}

/// Render warning when terminal is too small
fn render_size_warning(frame: &mut Frame, area: Rect) {
    let warning = Paragraph::new("Terminal too small!\nMinimum: 40x15")
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(warning, area);
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let style_name = state.controller.style().name();
    let title = Line::from(vec![
        Span::styled(
            " chatmock ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" │ "),
        Span::styled(style_name, Style::default().fg(Color::Yellow)),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(38)
                .saturating_sub(style_name.len()),
        )),
        Span::styled("[?]", Style::default().fg(Color::Green)),
        Span::raw(" Help  "),
        Span::styled("[Q]", Style::default().fg(Color::Red)),
        Span::raw(" Quit "),
    ]);

    let title_widget =
        Paragraph::new(title).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(title_widget, area);
}

/// Render the main content area
fn render_main_content(frame: &mut Frame, area: Rect, state: &AppState) {
    // Responsive layout: side-by-side if wide enough, stacked if narrow
    let (direction, constraints) = if area.width >= 80 {
        (
            Direction::Horizontal,
            [Constraint::Length(34), Constraint::Min(40)],
        )
    } else {
        (
            Direction::Vertical,
            [Constraint::Length(13), Constraint::Min(5)],
        )
    };

    let chunks = Layout::default()
        .direction(direction)
        .constraints(constraints)
        .split(area);

    render_control_panel(frame, chunks[0], state);
    preview::render_preview(frame, chunks[1], state);
}

/// Render the control panel
fn render_control_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Controls;

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            " Message ",
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    widgets::render_controls(frame, inner, state, is_focused);
}

/// Render the avatar path prompt
fn render_avatar_prompt(frame: &mut Frame, area: Rect, state: &AppState) {
    let width = area.width.saturating_sub(10).min(70);
    let prompt_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height / 2 - 1,
        width,
        height: 3,
    };

    frame.render_widget(Clear, prompt_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Avatar image path (Enter to load, Esc to cancel) ");
    let input = Paragraph::new(format!("{}▌", state.avatar_prompt_input)).block(block);
    frame.render_widget(input, prompt_area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let status_color = if state.status_is_error {
        Color::Red
    } else {
        Color::White
    };

    let export_info = state
        .last_export
        .as_ref()
        .and_then(|e| e.path.file_name())
        .map(|n| format!(" │ {}", n.to_string_lossy()))
        .unwrap_or_default();

    let spacing = (area.width as usize)
        .saturating_sub(state.status_message.chars().count())
        .saturating_sub(export_info.chars().count())
        .saturating_sub(2);

    let status = Line::from(vec![
        Span::raw(" "),
        Span::styled(&state.status_message, Style::default().fg(status_color)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(&export_info, Style::default().fg(Color::Blue)),
        Span::raw(" "),
    ]);

    let widget =
        Paragraph::new(status).style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(widget, area);
}
