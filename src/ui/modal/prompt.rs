//! Name prompt for creating a session or a worktree.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use super::{render_help_bar, render_input};
use crate::app::NamePrompt;
use crate::candidate::Mode;
use crate::ui::layout::centered_rect;

/// Widget for the create prompt.
pub struct NamePromptModal<'a> {
    prompt: &'a NamePrompt,
    mode: Mode,
}

impl<'a> NamePromptModal<'a> {
    pub fn new(prompt: &'a NamePrompt, mode: Mode) -> Self {
        Self { prompt, mode }
    }

    /// Centered, ~40% width, 10 lines.
    pub fn calculate_area(total: Rect) -> Rect {
        centered_rect(total, 40, 36, 10)
    }
}

impl Widget for NamePromptModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 6 {
            return;
        }

        Clear.render(area, buf);

        let (title, label) = match self.mode {
            Mode::Session => (" New Session ", "Session name:"),
            Mode::Worktree => (" New Worktree ", "Branch name:"),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Length(2), // Label
            Constraint::Length(3), // Input field
            Constraint::Length(1), // Error message
            Constraint::Min(0),    // Spacer
            Constraint::Length(1), // Help bar
        ])
        .split(inner);

        Paragraph::new(label)
            .style(Style::default().fg(Color::White))
            .render(chunks[0], buf);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let input_inner = input_block.inner(chunks[1]);
        input_block.render(chunks[1], buf);
        render_input(&self.prompt.input, input_inner, buf);

        if let Some(ref error) = self.prompt.error {
            Paragraph::new(Line::from(Span::styled(
                error.as_str(),
                Style::default().fg(Color::Red),
            )))
            .render(chunks[2], buf);
        }

        render_help_bar(&[("Enter", "create"), ("Esc", "quit")], chunks[4], buf);
    }
}
