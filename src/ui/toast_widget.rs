use crate::ui::toast::{Toast, ToastType};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Stacks toasts in the bottom-right corner of `area`, newest at the bottom.
pub struct ToastWidget<'a> {
    toasts: &'a [&'a Toast],
}

impl<'a> ToastWidget<'a> {
    pub fn new(toasts: &'a [&'a Toast]) -> Self {
        Self { toasts }
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        if self.toasts.is_empty() {
            return;
        }

        let toast_width = 48u16.min(area.width.saturating_sub(4));
        let gap = 1u16;
        let mut bottom = area.bottom().saturating_sub(2);

        for toast in self.toasts.iter().rev() {
            // long conflict messages wrap onto a second line
            let text_width = toast_width.saturating_sub(4).max(1) as usize;
            let lines = if toast.message.chars().count() + 2 > text_width { 2 } else { 1 };
            let toast_height = lines + 2;
            if bottom < area.top() + toast_height {
                break;
            }
            let y = bottom - toast_height;
            let x = area.right().saturating_sub(toast_width + 2);
            let toast_area = Rect::new(x, y, toast_width, toast_height);
            bottom = y.saturating_sub(gap);

            frame.render_widget(Clear, toast_area);

            let border_style = border_style(toast.toast_type);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .style(Style::default().bg(Color::Black));

            let text = Paragraph::new(Line::from(vec![
                Span::styled(icon(toast.toast_type), border_style.add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::raw(toast.message.as_str()),
            ]))
            .block(block)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);

            frame.render_widget(text, toast_area);
        }
    }
}

fn icon(toast_type: ToastType) -> &'static str {
    match toast_type {
        ToastType::Info => "ℹ",
        ToastType::Success => "✓",
        ToastType::Warning => "⚠",
        ToastType::Error => "✗",
    }
}

fn border_style(toast_type: ToastType) -> Style {
    let color = match toast_type {
        ToastType::Info => Color::Cyan,
        ToastType::Success => Color::Green,
        ToastType::Warning => Color::Yellow,
        ToastType::Error => Color::Red,
    };
    Style::default().fg(color)
}
