//! The main picker frame: search input, ranked candidate list and help bar.

use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, StatefulWidget, Widget},
};

use super::layout::picker_layout;
use super::modal::{render_help_bar, render_input};
use crate::app::App;
use crate::candidate::{Annotations, Candidate, Mode};
use crate::search::ScoredCandidate;
use crate::source::dir_name;

const LABEL_STYLE: Style = Style::new().fg(Color::White);
const MATCH_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const DIM_STYLE: Style = Style::new().fg(Color::DarkGray);

pub fn render_picker(app: &mut App, area: Rect, buf: &mut Buffer) {
    if area.width < 20 || area.height < 6 {
        return;
    }

    let title = format!(
        " {} ({}/{}) ",
        app.mode.display_name(),
        app.filtered.len(),
        app.all_candidates.len()
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    block.render(area, buf);

    let layout = picker_layout(inner);
    render_search_input(&app.query, layout.search, buf);
    render_list(app, layout.list, buf);

    let other = app.mode.toggle();
    let other_name = other.display_name().to_lowercase();
    let mut hints = vec![("↑↓", "nav"), ("Enter", "switch"), ("n", "new"), ("d", "delete")];
    if app.mode.supports_merge() {
        hints.push(("m", "merge"));
    }
    if app.is_available(other) {
        hints.push(("Tab", other_name.as_str()));
    }
    hints.push(("Esc", "quit"));
    render_help_bar(&hints, layout.help, buf);
}

fn render_search_input(query: &str, area: Rect, buf: &mut Buffer) {
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Search ");
    let input_inner = input_block.inner(area);
    input_block.render(area, buf);
    render_input(query, input_inner, buf);
}

fn render_list(app: &mut App, area: Rect, buf: &mut Buffer) {
    if app.filtered.is_empty() {
        let message = match (app.all_candidates.is_empty(), app.mode) {
            (true, Mode::Session) => "No tmux sessions. Press n to create one",
            (true, Mode::Worktree) => "No worktrees. Press n to create one",
            (false, _) => "No matches",
        };
        Paragraph::new(message)
            .style(DIM_STYLE)
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    }

    let items: Vec<ListItem> = app.filtered.iter().map(candidate_item).collect();
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    StatefulWidget::render(list, area, buf, &mut app.list_state);
}

fn candidate_item(scored: &ScoredCandidate) -> ListItem<'static> {
    let mut spans = highlighted_label(&scored.candidate.label, &scored.positions);
    spans.extend(annotation_spans(&scored.candidate));
    ListItem::new(Line::from(spans))
}

/// Split `label` into runs, styling the matched character positions.
fn highlighted_label(label: &str, positions: &[usize]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_matched = false;

    for (i, c) in label.chars().enumerate() {
        let matched = positions.contains(&i);
        if matched != run_matched && !run.is_empty() {
            spans.push(label_span(std::mem::take(&mut run), run_matched));
        }
        run_matched = matched;
        run.push(c);
    }
    if !run.is_empty() {
        spans.push(label_span(run, run_matched));
    }
    spans
}

fn label_span(text: String, matched: bool) -> Span<'static> {
    Span::styled(text, if matched { MATCH_STYLE } else { LABEL_STYLE })
}

fn annotation_spans(candidate: &Candidate) -> Vec<Span<'static>> {
    match &candidate.annotations {
        Annotations::Session {
            is_attached,
            project,
        } => {
            let mut spans = Vec::new();
            if *is_attached {
                spans.push(Span::styled("  ● attached", Style::default().fg(Color::Green)));
            }
            if !project.is_empty() {
                spans.push(Span::styled(format!("  {}", project), DIM_STYLE));
            }
            spans
        }
        Annotations::Worktree {
            branch,
            short_commit,
            is_dirty,
            is_main,
        } => {
            // the label is the branch unless HEAD is detached
            let mut spans = vec![if branch.is_empty() {
                Span::styled("  (detached)", DIM_STYLE)
            } else {
                Span::styled(
                    format!("  {}", dir_name(Path::new(&candidate.id))),
                    Style::default().fg(Color::Magenta),
                )
            }];
            spans.push(Span::styled(format!(" {}", short_commit), DIM_STYLE));
            if *is_dirty {
                spans.push(Span::styled(" ✱", Style::default().fg(Color::Yellow)));
            }
            if *is_main {
                spans.push(Span::styled(" [main]", Style::default().fg(Color::Cyan)));
            }
            spans
        }
    }
}
