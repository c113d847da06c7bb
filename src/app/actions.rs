//! Action dispatch: confirmed commands become adapter calls, and their results
//! decide the picker's next state.

use crate::candidate::{Candidate, Mode};
use crate::source::{CandidateSource, SourceError, SwitchOutcome};
use crate::ui::toast::{ToastType, CONFLICT_TOAST_DURATION};

use super::{App, Outcome, Phase};

/// A command the picker can dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Switch,
    /// Create a session (Session mode) or a worktree on a new branch (Worktree mode)
    Create(String),
    Delete,
    /// Merge the worktree's branch into the main branch
    Merge,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Switch => "switch",
            Action::Create(_) => "create",
            Action::Delete => "delete",
            Action::Merge => "merge",
        }
    }
}

/// What a successful action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Switched(SwitchOutcome),
    Created(Candidate),
    Deleted(Candidate),
    Merged { branch: String },
}

/// Failures surfaced to the user. None of them end the picker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Rejected before or by the adapter without side effects
    #[error("{0}")]
    Validation(String),

    /// The external tool failed or returned output we could not read
    #[error("{0}")]
    Adapter(String),

    /// Merge conflict or dirty working tree
    #[error("{0}")]
    Conflict(String),

    /// The candidate disappeared since the last snapshot
    #[error("'{0}' no longer exists")]
    NotFound(String),
}

impl From<SourceError> for ActionError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::Validation(message) | SourceError::Unavailable(message) => {
                ActionError::Validation(message)
            }
            e @ SourceError::Unsupported { .. } => ActionError::Validation(e.to_string()),
            SourceError::NotFound(id) => ActionError::NotFound(id),
            e @ (SourceError::DirtyTree(_) | SourceError::Conflict { .. }) => {
                ActionError::Conflict(e.to_string())
            }
            other => ActionError::Adapter(other.to_string()),
        }
    }
}

fn require(target: Option<&Candidate>) -> Result<&Candidate, ActionError> {
    target.ok_or_else(|| ActionError::Validation("Nothing selected".to_string()))
}

/// Checks that need no external call. Runs before any confirmation prompt
/// and again inside [`perform`].
pub fn precheck(mode: Mode, action: &Action, target: Option<&Candidate>) -> Result<(), ActionError> {
    if let Action::Create(name) = action {
        if name.trim().is_empty() {
            return Err(ActionError::Validation("Name cannot be empty".to_string()));
        }
        return Ok(());
    }
    if *action == Action::Merge && !mode.supports_merge() {
        return Err(ActionError::Validation(format!(
            "Merge is not available for {}",
            mode.display_name().to_lowercase()
        )));
    }

    let candidate = require(target)?;
    if candidate.kind() != mode {
        return Err(ActionError::Validation(format!(
            "'{}' is not one of the {}",
            candidate.label,
            mode.display_name().to_lowercase()
        )));
    }
    match action {
        Action::Delete if candidate.is_protected() => Err(ActionError::Validation(match mode {
            Mode::Session => format!("Cannot delete attached session '{}'", candidate.label),
            Mode::Worktree => "Cannot delete the main worktree".to_string(),
        })),
        Action::Merge if candidate.is_protected() => Err(ActionError::Validation(
            "Cannot merge the main worktree into itself".to_string(),
        )),
        Action::Merge if candidate.branch().is_none() => Err(ActionError::Validation(format!(
            "'{}' has a detached HEAD; there is no branch to merge",
            candidate.label
        ))),
        _ => Ok(()),
    }
}

/// Run `action` against `source`. Blocks until the external tool returns.
pub fn perform(
    source: &mut dyn CandidateSource,
    action: &Action,
    target: Option<&Candidate>,
) -> Result<Effect, ActionError> {
    precheck(source.mode(), action, target)?;

    let effect = match action {
        Action::Switch => Effect::Switched(source.switch_to(&require(target)?.id)?),
        Action::Create(name) => Effect::Created(source.create(name.trim())?),
        Action::Delete => {
            let candidate = require(target)?;
            source.delete(&candidate.id)?;
            Effect::Deleted(candidate.clone())
        }
        Action::Merge => {
            let candidate = require(target)?;
            source.merge(&candidate.id)?;
            Effect::Merged {
                branch: candidate.branch().unwrap_or(&candidate.label).to_string(),
            }
        }
    };
    Ok(effect)
}

impl App {
    /// Perform `action` on the active source and apply the result.
    pub(super) fn dispatch(&mut self, action: Action, target: Option<Candidate>) {
        tracing::debug!(
            action = action.name(),
            target = ?target.as_ref().map(|c| c.id.as_str()),
            "dispatching action"
        );
        let result = match self.sources.get_mut(self.mode) {
            Ok(source) => perform(source, &action, target.as_ref()),
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(effect) => {
                let merged = matches!(effect, Effect::Merged { .. });
                self.apply_effect(effect);
                if merged && self.settings.remove_after_merge {
                    tracing::debug!("removing merged worktree");
                    self.dispatch(Action::Delete, target);
                }
            }
            Err(error) => self.report_error(&action, error),
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Switched(outcome) => {
                tracing::info!(outcome = ?outcome, "switched");
                self.close(Outcome::Switched(outcome));
            }
            Effect::Created(candidate) => {
                tracing::info!(id = %candidate.id, "created");
                self.phase = Phase::Browsing;
                self.toast_manager
                    .push(format!("Created '{}'", candidate.label), ToastType::Success);
                self.refresh_selecting(Some(candidate.id));
            }
            Effect::Deleted(candidate) => {
                tracing::info!(id = %candidate.id, "deleted");
                self.phase = Phase::Browsing;
                self.toast_manager
                    .push(format!("Deleted '{}'", candidate.label), ToastType::Success);
                self.refresh();
            }
            Effect::Merged { branch } => {
                tracing::info!(branch = %branch, "merged");
                self.phase = Phase::Browsing;
                self.toast_manager.push(
                    format!("Merged '{}' into the main branch", branch),
                    ToastType::Success,
                );
                self.refresh();
            }
        }
    }

    /// Surface a failed action. The picker always stays open.
    pub(super) fn report_error(&mut self, action: &Action, error: ActionError) {
        match error {
            ActionError::NotFound(id) => {
                tracing::info!(action = action.name(), id = %id, "candidate vanished, refreshing");
                self.phase = Phase::Browsing;
                self.refresh();
            }
            ActionError::Validation(message) => {
                tracing::debug!(action = action.name(), reason = %message, "action rejected");
                if let Phase::PromptingNewName(prompt) = &mut self.phase {
                    prompt.error = Some(message);
                } else {
                    self.phase = Phase::Browsing;
                    self.toast_manager.push(message, ToastType::Warning);
                }
            }
            ActionError::Conflict(message) => {
                tracing::warn!(action = action.name(), error = %message, "action conflicted");
                self.phase = Phase::Browsing;
                self.toast_manager
                    .push_for(message, ToastType::Error, CONFLICT_TOAST_DURATION);
            }
            ActionError::Adapter(message) => {
                tracing::warn!(action = action.name(), error = %message, "action failed");
                self.phase = Phase::Browsing;
                self.toast_manager.push(message, ToastType::Error);
            }
        }
    }
}
