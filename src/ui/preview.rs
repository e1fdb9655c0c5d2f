//! Preview area rendering
//!
//! Draws the phone mock in the active style's colours. Terminal cells stand in
//! for the exported bitmap; icons use their single-cell symbols.

use palette::Srgb;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::draft::Avatar;
use crate::preview::PreviewNode;
use crate::state::{AppState, FocusedWidget};
use crate::style::{receipt_icons, ThemePalette};

/// Phone frame width in cells at 100% zoom
const PHONE_WIDTH: u16 = 44;

/// Render the preview area
pub fn render_preview(frame: &mut Frame, area: Rect, state: &AppState) {
    let is_focused = state.focus == FocusedWidget::Preview;

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = format!(" Preview · {} ", state.controller.style().name());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let node = state.controller.node();
    let theme = ThemePalette::for_style(state.controller.style());
    render_phone(frame, phone_rect(inner, node), node, &theme);
}

/// Centered phone frame, narrower when a presentation transform is set
fn phone_rect(area: Rect, node: &PreviewNode) -> Rect {
    let full = PHONE_WIDTH.min(area.width);
    let width = if node.transform.is_some() {
        (full as f32 * 0.9) as u16
    } else {
        full
    };
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y,
        width,
        height: area.height,
    }
}

fn colour(c: Srgb<u8>) -> Color {
    Color::Rgb(c.red, c.green, c.blue)
}

fn render_phone(frame: &mut Frame, area: Rect, node: &PreviewNode, theme: &ThemePalette) {
    if area.height < 5 || area.width < 12 {
        return;
    }

    let header = Rect { height: 2, ..area };
    let input = Rect {
        y: area.y + area.height - 1,
        height: 1,
        ..area
    };
    let chat = Rect {
        y: area.y + 2,
        height: area.height - 3,
        ..area
    };

    render_header(frame, header, node, theme);

    frame.render_widget(
        Block::default().style(Style::default().bg(colour(theme.chat_background))),
        chat,
    );
    render_bubble(frame, chat, node, theme);

    frame.render_widget(
        Paragraph::new(" Сообщение")
            .style(Style::default().bg(colour(theme.input_bar)).fg(colour(theme.time))),
        input,
    );
}

fn render_header(frame: &mut Frame, area: Rect, node: &PreviewNode, theme: &ThemePalette) {
    let text_style = Style::default().fg(colour(theme.header_text));
    let accent = Style::default().fg(colour(theme.accent));

    let back = node.back_icon().map(|i| i.symbol()).unwrap_or(" ");
    let menu = node.menu_icon().map(|i| i.symbol()).unwrap_or(" ");
    let avatar = match node.avatar {
        Avatar::Placeholder => Span::styled("●", Style::default().fg(colour(theme.avatar_placeholder))),
        Avatar::Image(_) => Span::styled("◉", accent),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", back), accent),
            avatar,
            Span::raw(" "),
            Span::styled(node.name.clone(), text_style.add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            format!("     {}", node.status),
            Style::default().fg(colour(theme.status_colour())),
        )),
    ];

    let style = Style::default().bg(colour(theme.header));
    frame.render_widget(Paragraph::new(lines).style(style), area);
    frame.render_widget(
        Paragraph::new(Span::styled(format!("{} ", menu), accent))
            .alignment(Alignment::Right),
        Rect { height: 1, ..area },
    );
}

fn render_bubble(frame: &mut Frame, chat: Rect, node: &PreviewNode, theme: &ThemePalette) {
    let max_inner = (chat.width.saturating_mul(3) / 4).saturating_sub(2).max(4) as usize;

    let receipt: String = receipt_icons(&node.receipt_markup)
        .iter()
        .map(|icon| icon.symbol())
        .collect();
    let footer = format!("{} {}", node.time, receipt);
    let footer_width = display_width(&footer);

    let lines = wrap_cells(&node.body, max_inner);
    let inner_width = lines
        .iter()
        .map(|l| display_width(l))
        .max()
        .unwrap_or(0)
        .max(footer_width)
        .min(max_inner.max(footer_width));

    let text_style = Style::default().fg(colour(theme.text));
    let mut rendered: Vec<Line> = lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, text_style)))
        .collect();
    rendered.push(
        Line::from(Span::styled(footer, Style::default().fg(colour(theme.receipt))))
            .alignment(Alignment::Right),
    );

    let height = (rendered.len() as u16).min(chat.height);
    let width = (inner_width as u16 + 2).min(chat.width);
    let margin = if chat.width > width { 1 } else { 0 };
    let bubble = Rect {
        x: chat.x + chat.width - width - margin,
        y: chat.y + chat.height - height,
        width,
        height,
    };

    // show the end of long messages, like a chat scrolled to the bottom
    let skip = rendered.len().saturating_sub(height as usize) as u16;
    frame.render_widget(
        Paragraph::new(rendered)
            .scroll((skip, 0))
            .style(Style::default().bg(colour(theme.bubble)))
            .block(Block::default().padding(ratatui::widgets::Padding::horizontal(1))),
        bubble,
    );
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Break text into rows of at most `width` cells, honouring line breaks
fn wrap_cells(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for paragraph in text.split('\n') {
        let mut row = String::new();
        let mut used = 0;
        for c in paragraph.chars().filter(|&c| c != '\r') {
            let w = c.width().unwrap_or(0);
            if used + w > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            row.push(c);
            used += w;
        }
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_cells_honours_breaks() {
        assert_eq!(wrap_cells("line1\nline2", 20), vec!["line1", "line2"]);
        assert_eq!(wrap_cells("", 20), vec![""]);
        assert_eq!(wrap_cells("abcdef", 4), vec!["abcd", "ef"]);
    }

    #[test]
    fn test_phone_narrows_when_zoomed() {
        let area = Rect::new(0, 0, 100, 30);
        let mut node = PreviewNode::default();
        let full = phone_rect(area, &node);
        node.transform = Some("scale(0.9)".to_string());
        let zoomed = phone_rect(area, &node);
        assert_eq!(full.width, PHONE_WIDTH);
        assert!(zoomed.width < full.width);
    }
}
