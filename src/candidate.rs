//! Candidate records: the rows a picker displays.
//!
//! Candidates are immutable values. A snapshot from a source is replaced
//! wholesale on every refresh, never patched in place.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The resource kind a picker is browsing. Doubles as the candidate kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// tmux sessions
    #[default]
    Session,
    /// git worktrees
    Worktree,
}

impl Mode {
    /// Title shown on the picker border
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Session => "Sessions",
            Mode::Worktree => "Worktrees",
        }
    }

    /// The other mode
    pub fn toggle(&self) -> Self {
        match self {
            Mode::Session => Mode::Worktree,
            Mode::Worktree => Mode::Session,
        }
    }

    /// Whether the merge command exists in this mode
    pub fn supports_merge(&self) -> bool {
        matches!(self, Mode::Worktree)
    }
}

/// Kind-specific metadata attached to a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotations {
    Session {
        /// A client is attached, or it is the session running the picker
        is_attached: bool,
        /// Basename of the session's start directory
        project: String,
    },
    Worktree {
        /// Checked-out branch (empty for a detached HEAD)
        branch: String,
        short_commit: String,
        is_dirty: bool,
        is_main: bool,
    },
}

/// One selectable row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Stable identifier: session name, or worktree path
    pub id: String,
    /// Text the fuzzy matcher runs against
    pub label: String,
    pub annotations: Annotations,
}

impl Candidate {
    /// Build a session candidate. Session names are both id and label.
    pub fn session(name: impl Into<String>, is_attached: bool, project: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            label: name,
            annotations: Annotations::Session {
                is_attached,
                project: project.into(),
            },
        }
    }

    /// Build a worktree candidate keyed by its path.
    ///
    /// The label is the branch, or the directory name for a detached HEAD.
    pub fn worktree(
        path: &Path,
        branch: impl Into<String>,
        short_commit: impl Into<String>,
        is_dirty: bool,
        is_main: bool,
    ) -> Self {
        let id = path.to_string_lossy().into_owned();
        let branch = branch.into();
        let label = if branch.is_empty() {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| id.clone())
        } else {
            branch.clone()
        };
        Self {
            id,
            label,
            annotations: Annotations::Worktree {
                branch,
                short_commit: short_commit.into(),
                is_dirty,
                is_main,
            },
        }
    }

    pub fn kind(&self) -> Mode {
        match self.annotations {
            Annotations::Session { .. } => Mode::Session,
            Annotations::Worktree { .. } => Mode::Worktree,
        }
    }

    /// The attached session or the main worktree. These can never be deleted
    /// (and the main worktree can never be merged).
    pub fn is_protected(&self) -> bool {
        match self.annotations {
            Annotations::Session { is_attached, .. } => is_attached,
            Annotations::Worktree { is_main, .. } => is_main,
        }
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.annotations, Annotations::Worktree { is_dirty: true, .. })
    }

    /// Branch name for worktrees; `None` for sessions and detached worktrees.
    pub fn branch(&self) -> Option<&str> {
        match &self.annotations {
            Annotations::Worktree { branch, .. } if !branch.is_empty() => Some(branch),
            _ => None,
        }
    }
}
