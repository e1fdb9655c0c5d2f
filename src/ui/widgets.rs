//! Control panel widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::draft::{Avatar, Field};
use crate::state::{AppState, Control};

/// Longest value shown before truncation
const VALUE_WIDTH: usize = 14;

/// Render the control rows
pub fn render_controls(frame: &mut Frame, area: Rect, state: &AppState, is_focused: bool) {
    let draft = state.controller.draft();
    let mut lines = Vec::new();

    for (idx, control) in Control::all().iter().enumerate() {
        let is_selected = idx == state.selected && is_focused;

        if let Some(field) = control.field() {
            lines.push(field_line(field, state, is_selected));
            continue;
        }

        let (value, hint) = match control {
            Control::Style => (state.controller.style().name().to_string(), Some("[←/→]")),
            Control::Read => (
                if draft.is_read { "Read ✓✓" } else { "Sent ✓" }.to_string(),
                Some("[Space]"),
            ),
            Control::Avatar => (
                match draft.avatar {
                    Avatar::Placeholder => "Placeholder".to_string(),
                    Avatar::Image(ref img) => format!("{}×{}", img.width(), img.height()),
                },
                Some("[Enter]"),
            ),
            Control::Export => (
                if state.is_exporting { "Working..." } else { "PNG 1125×2001" }.to_string(),
                Some("[Enter]"),
            ),
            _ => (String::new(), None),
        };
        lines.push(create_setting_line(control.name(), &value, is_selected, hint));
    }

    lines.push(Line::from(""));
    lines.push(create_action_line("[1/2/3]", "Pick style"));
    lines.push(create_action_line("[E]", "Export PNG"));
    lines.push(create_action_line("[C]", "Copy last export"));
    lines.push(create_action_line("[Z]", "Toggle zoom"));

    let widget = Paragraph::new(lines);
    frame.render_widget(widget, area);
}

fn field_line(field: Field, state: &AppState, is_selected: bool) -> Line<'static> {
    let is_editing = state.editing == Some(field);
    let raw = if is_editing {
        state.edit_buffer.as_str()
    } else {
        state.controller.draft().field(field)
    };

    // line breaks are shown as ⏎ so the row stays one line
    let flat = raw.replace('\n', "⏎");
    let display = if is_editing {
        format!("{}▌", tail(&flat, VALUE_WIDTH))
    } else if flat.is_empty() {
        "[empty]".to_string()
    } else {
        head(&flat, VALUE_WIDTH)
    };

    let mut line = create_setting_line(field.name(), &display, is_selected, Some("[Enter]"));
    if is_editing {
        if let Some(value) = line.spans.get_mut(2) {
            value.style = Style::default().fg(Color::Green);
        }
    }
    line
}

/// Leading part of `text` no wider than `width` columns
fn head(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        if out.width() + 1 >= width {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

/// Trailing part of `text` no wider than `width` columns, for the edit cursor
fn tail(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut chars: Vec<char> = Vec::new();
    for c in text.chars().rev() {
        let candidate: String = std::iter::once(c).chain(chars.iter().rev().copied()).collect();
        if candidate.width() + 1 > width {
            break;
        }
        chars.push(c);
    }
    let kept: String = chars.into_iter().rev().collect();
    format!("…{}", kept)
}

/// Create a setting line with label, value, and optional hint
fn create_setting_line(
    label: &str,
    value: &str,
    is_selected: bool,
    hint: Option<&str>,
) -> Line<'static> {
    let indicator = if is_selected { "▸" } else { " " };
    let indicator_style = Style::default().fg(Color::Cyan);

    let label_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let value_style = if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(format!("{} ", indicator), indicator_style),
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(value.to_string(), value_style),
    ];

    if let Some(hint_text) = hint.filter(|_| is_selected) {
        spans.push(Span::styled(
            format!(" {}", hint_text),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}

/// Create an action line (button-like)
fn create_action_line(key: &str, label: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(key.to_string(), Style::default().fg(Color::Green)),
        Span::styled(format!(" {}", label), Style::default().fg(Color::White)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_truncates_with_ellipsis() {
        assert_eq!(head("short", 10), "short");
        let cut = head("a much longer value", 8);
        assert!(cut.ends_with('…'));
        assert!(cut.width() <= 8);
    }

    #[test]
    fn test_tail_keeps_the_end() {
        assert_eq!(tail("short", 10), "short");
        let cut = tail("a much longer value", 8);
        assert!(cut.starts_with('…'));
        assert!(cut.ends_with("value"));
        assert!(cut.width() <= 8);
    }
}
