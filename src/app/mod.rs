//! The picker state machine.
//!
//! [`App`] owns the mode, the query, the current snapshot and its filtered
//! ranking, the selection and the current sub-state. Keys arrive one at a
//! time through [`App::handle_key`]; every adapter call blocks the loop until
//! it returns.

mod actions;
mod navigation;
mod state;

use ratatui::widgets::ListState;

use crate::candidate::{Candidate, Mode};
use crate::input::{PickerKey, PAGE_SIZE};
use crate::search::{fuzzy_match, ScoredCandidate};
use crate::source::{CandidateSource, SourceError};
use crate::ui::toast::{ToastManager, ToastType};

pub use actions::{perform, precheck, Action, ActionError, Effect};
pub use state::{NamePrompt, Outcome, Phase, PickerSettings};

/// The adapters behind each mode. Worktree mode is missing outside a repository.
pub struct Sources {
    session: Box<dyn CandidateSource>,
    worktree: Result<Box<dyn CandidateSource>, String>,
}

impl Sources {
    /// `worktree` carries the reason when worktree mode cannot be used.
    pub fn new(
        session: Box<dyn CandidateSource>,
        worktree: Result<Box<dyn CandidateSource>, String>,
    ) -> Self {
        Self { session, worktree }
    }

    pub fn is_available(&self, mode: Mode) -> bool {
        match mode {
            Mode::Session => true,
            Mode::Worktree => self.worktree.is_ok(),
        }
    }

    fn get(&self, mode: Mode) -> Result<&dyn CandidateSource, SourceError> {
        match (mode, &self.worktree) {
            (Mode::Session, _) => Ok(&*self.session),
            (Mode::Worktree, Ok(source)) => Ok(&**source),
            (Mode::Worktree, Err(reason)) => Err(SourceError::Unavailable(reason.clone())),
        }
    }

    fn get_mut(&mut self, mode: Mode) -> Result<&mut dyn CandidateSource, SourceError> {
        match (mode, &mut self.worktree) {
            (Mode::Session, _) => Ok(&mut *self.session),
            (Mode::Worktree, Ok(source)) => Ok(&mut **source),
            (Mode::Worktree, Err(reason)) => Err(SourceError::Unavailable(reason.clone())),
        }
    }
}

/// Picker state
pub struct App {
    /// Which source is being browsed
    pub mode: Mode,
    sources: Sources,
    pub query: String,
    /// Latest snapshot, in source order
    pub all_candidates: Vec<Candidate>,
    /// Matches for `query`, best first
    pub filtered: Vec<ScoredCandidate>,
    /// Index into `filtered`; `None` exactly when `filtered` is empty
    selected: Option<usize>,
    /// Mirrors `selected` for the list widget
    pub list_state: ListState,
    pub phase: Phase,
    pub is_open: bool,
    outcome: Option<Outcome>,
    settings: PickerSettings,
    pub toast_manager: ToastManager,
}

impl App {
    /// Open the picker in `mode` with a fresh snapshot and an empty query.
    pub fn open(mode: Mode, sources: Sources) -> Result<Self, SourceError> {
        let all_candidates = sources.get(mode)?.list()?;
        tracing::info!(mode = ?mode, candidates = all_candidates.len(), "picker opened");

        let mut app = Self {
            mode,
            sources,
            query: String::new(),
            filtered: fuzzy_match("", &all_candidates),
            all_candidates,
            selected: None,
            list_state: ListState::default(),
            phase: Phase::Browsing,
            is_open: true,
            outcome: None,
            settings: PickerSettings::default(),
            toast_manager: ToastManager::new(),
        };
        app.reselect(None, 0);
        Ok(app)
    }

    pub fn with_settings(mut self, settings: PickerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> PickerSettings {
        self.settings
    }

    /// Re-open in `mode`: fresh snapshot, empty query, selection at the top.
    /// On failure nothing changes.
    pub fn open_mode(&mut self, mode: Mode) -> Result<(), SourceError> {
        let candidates = self.sources.get(mode)?.list()?;
        self.mode = mode;
        self.phase = Phase::Browsing;
        self.query.clear();
        self.all_candidates = candidates;
        self.filtered = fuzzy_match(&self.query, &self.all_candidates);
        self.reselect(None, 0);
        tracing::debug!(mode = ?mode, candidates = self.all_candidates.len(), "picker reopened");
        Ok(())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_candidate(&self) -> Option<&Candidate> {
        self.selected
            .and_then(|i| self.filtered.get(i))
            .map(|scored| &scored.candidate)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_available(&self, mode: Mode) -> bool {
        self.sources.is_available(mode)
    }

    /// Expire old toasts. Called once per loop iteration.
    pub fn tick(&mut self) {
        self.toast_manager.update();
    }

    pub fn handle_key(&mut self, key: PickerKey) {
        if !self.is_open {
            return;
        }
        if key == PickerKey::Escape {
            self.close(Outcome::Cancelled);
            return;
        }
        match self.phase {
            Phase::Browsing => self.handle_browsing_key(key),
            Phase::PromptingNewName(_) => self.handle_prompt_key(key),
            Phase::ConfirmingDelete(_) | Phase::ConfirmingMerge(_) => self.handle_confirm_key(key),
        }
    }

    /// Close the picker and discard its state.
    pub fn close(&mut self, outcome: Outcome) {
        tracing::info!(outcome = ?outcome, "picker closed");
        self.is_open = false;
        self.outcome = Some(outcome);
        self.phase = Phase::Browsing;
        self.query.clear();
        self.all_candidates.clear();
        self.filtered.clear();
        self.select(None);
        self.toast_manager.clear();
    }

    /// Re-snapshot the active source, keeping the query. Returns false when
    /// the listing failed and the previous snapshot was kept.
    pub fn refresh(&mut self) -> bool {
        self.refresh_selecting(None)
    }

    /// Refresh, then select `prefer` if given, else the previously selected
    /// candidate, else the previous index clamped to the new list.
    fn refresh_selecting(&mut self, prefer: Option<String>) -> bool {
        let keep = prefer.or_else(|| self.selected_candidate().map(|c| c.id.clone()));
        let previous_index = self.selected.unwrap_or(0);

        let snapshot = self.sources.get(self.mode).and_then(|source| source.list());
        match snapshot {
            Ok(candidates) => self.all_candidates = candidates,
            Err(e) => {
                tracing::warn!(mode = ?self.mode, error = %e, "refresh failed");
                self.toast_manager
                    .push(format!("Refresh failed: {}", e), ToastType::Error);
                return false;
            }
        }
        self.filtered = fuzzy_match(&self.query, &self.all_candidates);
        self.reselect(keep.as_deref(), previous_index);
        true
    }

    /// Re-rank after a query edit: the same candidate stays selected if it
    /// still matches, otherwise the top row.
    fn refilter(&mut self) {
        let keep = self.selected_candidate().map(|c| c.id.clone());
        self.filtered = fuzzy_match(&self.query, &self.all_candidates);
        self.reselect(keep.as_deref(), 0);
    }

    /// `n` and `d` in every mode, `m` where merging exists.
    fn is_command(&self, c: char) -> bool {
        matches!(c, 'n' | 'd') || (c == 'm' && self.mode.supports_merge())
    }

    fn handle_browsing_key(&mut self, key: PickerKey) {
        match key {
            PickerKey::Char(c) if self.query.is_empty() && self.is_command(c) => {
                self.begin_command(c);
            }
            PickerKey::Char(c) => {
                self.query.push(c);
                self.refilter();
            }
            PickerKey::Backspace => {
                if self.query.pop().is_some() {
                    self.refilter();
                }
            }
            PickerKey::ClearQuery => {
                if !self.query.is_empty() {
                    self.query.clear();
                    self.refilter();
                }
            }
            PickerKey::Up => self.move_selection(-1),
            PickerKey::Down => self.move_selection(1),
            PickerKey::PageUp => self.move_selection(-(PAGE_SIZE as isize)),
            PickerKey::PageDown => self.move_selection(PAGE_SIZE as isize),
            PickerKey::Enter => {
                if let Some(candidate) = self.selected_candidate().cloned() {
                    self.dispatch(Action::Switch, Some(candidate));
                }
            }
            PickerKey::ToggleMode => self.toggle_mode(),
            PickerKey::Refresh => {
                if self.refresh() {
                    self.toast_manager.push(
                        format!(
                            "Refreshed {} {}",
                            self.all_candidates.len(),
                            self.mode.display_name().to_lowercase()
                        ),
                        ToastType::Info,
                    );
                }
            }
            PickerKey::Escape => self.close(Outcome::Cancelled),
        }
    }

    fn begin_command(&mut self, c: char) {
        if c == 'n' {
            self.phase = Phase::PromptingNewName(NamePrompt::default());
            return;
        }
        let Some(candidate) = self.selected_candidate().cloned() else {
            return;
        };
        let action = if c == 'm' { Action::Merge } else { Action::Delete };
        if let Err(error) = precheck(self.mode, &action, Some(&candidate)) {
            self.report_error(&action, error);
            return;
        }
        self.phase = match action {
            Action::Merge => Phase::ConfirmingMerge(candidate),
            _ => Phase::ConfirmingDelete(candidate),
        };
    }

    fn handle_prompt_key(&mut self, key: PickerKey) {
        let Phase::PromptingNewName(prompt) = &mut self.phase else {
            return;
        };
        match key {
            PickerKey::Char(c) => {
                prompt.input.push(c);
                prompt.error = None;
            }
            PickerKey::Backspace => {
                if prompt.input.is_empty() {
                    self.phase = Phase::Browsing;
                } else {
                    prompt.input.pop();
                    prompt.error = None;
                }
            }
            PickerKey::ClearQuery => {
                prompt.input.clear();
                prompt.error = None;
            }
            PickerKey::Enter => {
                let name = prompt.input.clone();
                self.dispatch(Action::Create(name), None);
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: PickerKey) {
        match key {
            PickerKey::Char('y' | 'Y') | PickerKey::Enter => {
                let (action, candidate) = match std::mem::take(&mut self.phase) {
                    Phase::ConfirmingDelete(candidate) => (Action::Delete, candidate),
                    Phase::ConfirmingMerge(candidate) => (Action::Merge, candidate),
                    other => {
                        self.phase = other;
                        return;
                    }
                };
                self.dispatch(action, Some(candidate));
            }
            PickerKey::Char('n' | 'N') => self.phase = Phase::Browsing,
            _ => {}
        }
    }

    fn toggle_mode(&mut self) {
        let next = self.mode.toggle();
        if let Err(e) = self.open_mode(next) {
            tracing::warn!(mode = ?next, error = %e, "could not switch mode");
            self.toast_manager.push(e.to_string(), ToastType::Warning);
        }
    }
}
