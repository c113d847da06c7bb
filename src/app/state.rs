//! Independent type definitions used by App.

use crate::candidate::Candidate;
use crate::source::SwitchOutcome;

/// Short-lived sub-states of an open picker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Typing a query and moving through the list
    #[default]
    Browsing,
    /// Asking for a session or branch name
    PromptingNewName(NamePrompt),
    /// Waiting for y/n before deleting
    ConfirmingDelete(Candidate),
    /// Waiting for y/n before merging
    ConfirmingMerge(Candidate),
}

/// Text input for the create prompt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamePrompt {
    pub input: String,
    /// Validation error from the last submit, shown under the input
    pub error: Option<String>,
}

/// Behaviour switches taken from the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PickerSettings {
    /// Delete the worktree once its branch has been merged
    pub remove_after_merge: bool,
}

/// How the picker was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Escape: nothing was switched
    Cancelled,
    Switched(SwitchOutcome),
}

impl Outcome {
    /// Session to attach once the terminal is restored, if the switch was deferred.
    pub fn attach_on_exit(&self) -> Option<&str> {
        match self {
            Outcome::Switched(SwitchOutcome::AttachOnExit { session }) => Some(session),
            _ => None,
        }
    }
}
