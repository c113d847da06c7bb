//! Candidate sources: adapters that enumerate and mutate the live set of
//! tmux sessions or git worktrees by shelling out to the external tool.
//!
//! Every snapshot may be stale by the time an action runs; adapters report a
//! vanished target as [`SourceError::NotFound`] instead of failing hard.

pub mod command;
pub mod git;
pub mod tmux;

#[cfg(test)]
pub(crate) mod fake;

use std::path::Path;
use std::time::Duration;

use crate::candidate::{Candidate, Mode};

pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use git::GitWorktreeSource;
pub use tmux::{TmuxClient, TmuxSessionSource};

/// What a successful switch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The tmux client now shows the session
    Switched { session: String },
    /// The session was already the active one; nothing was run
    AlreadyActive { session: String },
    /// Not running inside tmux: attach once the picker releases the terminal
    AttachOnExit { session: String },
}

/// The capability set shared by both adapters.
pub trait CandidateSource {
    /// Which kind of candidates this source produces
    fn mode(&self) -> Mode;

    /// Take a fresh snapshot, ordered by the source's own priority.
    fn list(&self) -> Result<Vec<Candidate>, SourceError>;

    /// Create a resource (session name or branch name) and return its candidate.
    fn create(&mut self, name: &str) -> Result<Candidate, SourceError>;

    fn delete(&mut self, id: &str) -> Result<(), SourceError>;

    /// Make `id` the active context. Switching to the active one is a no-op success.
    fn switch_to(&mut self, id: &str) -> Result<SwitchOutcome, SourceError>;

    /// Merge the candidate's branch into the main branch.
    fn merge(&mut self, id: &str) -> Result<(), SourceError> {
        let _ = id;
        Err(SourceError::Unsupported {
            operation: "merge",
            mode: self.mode(),
        })
    }
}

/// Errors raised by adapters and the command runner.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{0}")]
    Validation(String),

    #[error("'{0}' no longer exists")]
    NotFound(String),

    #[error("'{0}' has uncommitted changes")]
    DirtyTree(String),

    #[error("merge of '{branch}' conflicts in: {}", .files.join(", "))]
    Conflict { branch: String, files: Vec<String> },

    #[error("{0}")]
    Unavailable(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program} {args}` failed{}: {stderr}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    Command {
        program: String,
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} did not finish within {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("unexpected output from {program}: {detail}")]
    Parse { program: String, detail: String },

    #[error("{operation} is not available for {}", .mode.display_name().to_lowercase())]
    Unsupported { operation: &'static str, mode: Mode },
}

impl SourceError {
    pub(crate) fn parse(program: &str, detail: impl Into<String>) -> Self {
        SourceError::Parse {
            program: program.to_string(),
            detail: detail.into(),
        }
    }
}

/// Basename of a directory, for display.
pub(crate) fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
