//! Yes/no confirmation before a delete or a merge.

use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use super::render_help_bar;
use crate::app::Phase;
use crate::candidate::{Candidate, Mode};
use crate::source::dir_name;
use crate::ui::layout::centered_rect;

/// Widget for the delete/merge confirmation.
pub struct ConfirmModal<'a> {
    candidate: &'a Candidate,
    merge: bool,
    /// A confirmed merge also removes the worktree
    remove_after_merge: bool,
}

impl<'a> ConfirmModal<'a> {
    /// `None` unless `phase` is waiting for a confirmation.
    pub fn from_phase(phase: &'a Phase) -> Option<Self> {
        match phase {
            Phase::ConfirmingDelete(candidate) => Some(Self {
                candidate,
                merge: false,
                remove_after_merge: false,
            }),
            Phase::ConfirmingMerge(candidate) => Some(Self {
                candidate,
                merge: true,
                remove_after_merge: false,
            }),
            _ => None,
        }
    }

    pub fn with_remove_after_merge(mut self, remove: bool) -> Self {
        self.remove_after_merge = remove;
        self
    }

    pub fn calculate_area(total: Rect) -> Rect {
        centered_rect(total, 50, 40, 8)
    }

    fn question(&self) -> String {
        let label = &self.candidate.label;
        match (self.merge, self.candidate.kind()) {
            (true, _) if self.remove_after_merge => format!(
                "Merge branch '{}' into the main branch and remove its worktree?",
                self.candidate.branch().unwrap_or(label)
            ),
            (true, _) => format!(
                "Merge branch '{}' into the main branch?",
                self.candidate.branch().unwrap_or(label)
            ),
            (false, Mode::Session) => format!("Kill session '{}'?", label),
            (false, Mode::Worktree) => {
                let dir = dir_name(Path::new(&self.candidate.id));
                match self.candidate.branch() {
                    Some(branch) => format!("Remove worktree '{}' ({})?", dir, branch),
                    None => format!("Remove worktree '{}'?", dir),
                }
            }
        }
    }
}

impl Widget for ConfirmModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 5 {
            return;
        }

        Clear.render(area, buf);

        let (title, color) = if self.merge {
            (" Merge ", Color::Cyan)
        } else {
            (" Delete ", Color::Red)
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::vertical([
            Constraint::Min(1),    // Question
            Constraint::Length(1), // Warning
            Constraint::Length(1), // Help bar
        ])
        .split(inner);

        Paragraph::new(self.question())
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        if !self.merge && self.candidate.is_dirty() {
            Paragraph::new(Line::from(Span::styled(
                "Uncommitted changes will be lost",
                Style::default().fg(Color::Yellow),
            )))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        }

        render_help_bar(&[("y", "confirm"), ("n", "back"), ("Esc", "quit")], chunks[2], buf);
    }
}
