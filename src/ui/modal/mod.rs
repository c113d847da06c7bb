//! Dialogs drawn over the picker for its sub-states, plus the small pieces
//! they share with the main picker frame.

pub mod confirm;
pub mod prompt;

pub use confirm::ConfirmModal;
pub use prompt::NamePromptModal;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Render `(key, description)` pairs as a centered help bar.
pub fn render_help_bar(hints: &[(&str, &str)], area: Rect, buf: &mut Buffer) {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, description)| {
            [
                Span::styled(format!(" {} ", key), key_style),
                Span::raw(format!("{} ", description)),
            ]
        })
        .collect();

    Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// Render single-line text input with a block cursor at the end, scrolled so
/// the cursor stays visible.
pub fn render_input(text: &str, area: Rect, buf: &mut Buffer) {
    let available = (area.width as usize).saturating_sub(1);
    let len = text.chars().count();
    let visible: String = text.chars().skip(len.saturating_sub(available)).collect();

    Paragraph::new(Line::from(vec![
        Span::raw(visible),
        Span::styled(" ", Style::default().bg(Color::White)),
    ]))
    .render(area, buf);
}
