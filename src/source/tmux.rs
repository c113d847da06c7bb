//! tmux integration: the session adapter and the client it is built on.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::rc::Rc;

use super::{dir_name, CandidateSource, CommandOutput, CommandRunner, SourceError, SwitchOutcome};
use crate::candidate::{Candidate, Mode};

const TMUX: &str = "tmux";

/// `list-sessions` format: name, attached flag, start directory, last activity.
const SESSION_FORMAT: &str =
    "#{session_name}\t#{?session_attached,1,0}\t#{session_path}\t#{session_activity}";

/// One row of `tmux list-sessions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmuxSession {
    pub name: String,
    pub attached: bool,
    pub path: PathBuf,
    /// Unix timestamp of the last activity
    pub last_activity: u64,
}

/// Parse `list-sessions -F` output produced with [`SESSION_FORMAT`].
pub fn parse_sessions(output: &str) -> Result<Vec<TmuxSession>, SourceError> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 4 {
                return Err(SourceError::parse(
                    TMUX,
                    format!("expected 4 fields in session row, got {:?}", line),
                ));
            }
            Ok(TmuxSession {
                name: parts[0].to_string(),
                attached: parts[1] == "1",
                path: PathBuf::from(parts[2]),
                last_activity: parts[3].trim().parse().unwrap_or(0),
            })
        })
        .collect()
}

/// Check a session name against what tmux accepts.
pub fn validate_session_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Session name cannot be empty".to_string());
    }
    if name.contains('.') || name.contains(':') {
        return Err("Session name cannot contain '.' or ':'".to_string());
    }
    if name.chars().any(char::is_control) {
        return Err("Session name cannot contain control characters".to_string());
    }
    Ok(())
}

/// Turn an arbitrary label (e.g. a worktree directory) into a usable session name.
pub fn sanitize_session_name(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '.' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `=name` targets a session by exact name instead of tmux's prefix matching.
fn exact_target(name: &str) -> String {
    format!("={}", name)
}

fn is_no_server(stderr: &str) -> bool {
    stderr.contains("no server running")
        || stderr.contains("no sessions")
        || stderr.contains("error connecting to")
}

/// Thin wrapper over the tmux command line.
#[derive(Clone)]
pub struct TmuxClient {
    runner: Rc<dyn CommandRunner>,
    inside_tmux: bool,
}

impl TmuxClient {
    pub fn new(runner: Rc<dyn CommandRunner>, inside_tmux: bool) -> Self {
        Self {
            runner,
            inside_tmux,
        }
    }

    /// Detect whether the picker itself runs inside a tmux client (`$TMUX`).
    pub fn from_env(runner: Rc<dyn CommandRunner>) -> Self {
        let inside_tmux = std::env::var_os("TMUX").is_some_and(|v| !v.is_empty());
        Self::new(runner, inside_tmux)
    }

    fn tmux(&self, args: &[&str]) -> Result<CommandOutput, SourceError> {
        self.runner.run(TMUX, args, None)
    }

    pub fn list_sessions(&self) -> Result<Vec<TmuxSession>, SourceError> {
        let args = ["list-sessions", "-F", SESSION_FORMAT];
        let output = self.tmux(&args)?;
        if !output.success {
            if is_no_server(&output.stderr) {
                return Ok(Vec::new());
            }
            return Err(output.into_error(TMUX, &args));
        }
        parse_sessions(&output.stdout)
    }

    /// Session of the client running the picker, if any.
    pub fn current_session(&self) -> Option<String> {
        if !self.inside_tmux {
            return None;
        }
        match self.tmux(&["display-message", "-p", "#{session_name}"]) {
            Ok(output) if output.success => {
                let name = output.stdout.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
            Ok(output) => {
                tracing::debug!(stderr = %output.stderr.trim(), "could not read current session");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read current session");
                None
            }
        }
    }

    pub fn has_session(&self, name: &str) -> Result<bool, SourceError> {
        let target = exact_target(name);
        Ok(self.tmux(&["has-session", "-t", &target])?.success)
    }

    /// Start a detached session, optionally rooted at `dir`.
    pub fn new_session(&self, name: &str, dir: Option<&Path>) -> Result<(), SourceError> {
        let dir = dir.map(|d| d.to_string_lossy().into_owned());
        let mut args = vec!["new-session", "-d", "-s", name];
        if let Some(ref dir) = dir {
            args.extend(["-c", dir.as_str()]);
        }
        self.tmux(&args)?.into_stdout(TMUX, &args)?;
        tracing::info!(session = name, dir = ?dir, "created tmux session");
        Ok(())
    }

    pub fn kill_session(&self, name: &str) -> Result<(), SourceError> {
        let target = exact_target(name);
        let args = ["kill-session", "-t", target.as_str()];
        self.tmux(&args)?.into_stdout(TMUX, &args)?;
        tracing::info!(session = name, "killed tmux session");
        Ok(())
    }

    /// Point the current client at `name`.
    ///
    /// Outside tmux there is no client to switch, so the attach is deferred
    /// until the picker has given the terminal back.
    pub fn switch_client(&self, name: &str) -> Result<SwitchOutcome, SourceError> {
        let session = name.to_string();
        if self.current_session().as_deref() == Some(name) {
            return Ok(SwitchOutcome::AlreadyActive { session });
        }
        if !self.inside_tmux {
            return Ok(SwitchOutcome::AttachOnExit { session });
        }
        let target = exact_target(name);
        let args = ["switch-client", "-t", target.as_str()];
        self.tmux(&args)?.into_stdout(TMUX, &args)?;
        tracing::info!(session = name, "switched tmux client");
        Ok(SwitchOutcome::Switched { session })
    }
}

/// Attach the calling terminal to `name`. Blocks until the user detaches.
pub fn attach_session(name: &str) -> std::io::Result<ExitStatus> {
    Command::new(TMUX)
        .args(["attach-session", "-t", &exact_target(name)])
        .status()
}

/// Session adapter: candidates are tmux sessions, ids are session names.
pub struct TmuxSessionSource {
    client: TmuxClient,
    default_dir: Option<PathBuf>,
}

impl TmuxSessionSource {
    pub fn new(client: TmuxClient, default_dir: Option<PathBuf>) -> Self {
        Self {
            client,
            default_dir,
        }
    }

    fn find(&self, name: &str) -> Result<Option<Candidate>, SourceError> {
        Ok(self.list()?.into_iter().find(|c| c.id == name))
    }
}

impl CandidateSource for TmuxSessionSource {
    fn mode(&self) -> Mode {
        Mode::Session
    }

    fn list(&self) -> Result<Vec<Candidate>, SourceError> {
        let current = self.client.current_session();
        let mut sessions = self.client.list_sessions()?;

        // current client's session, then other attached ones, then most recent activity
        sessions.sort_by(|a, b| {
            let a_current = current.as_deref() == Some(a.name.as_str());
            let b_current = current.as_deref() == Some(b.name.as_str());
            b_current
                .cmp(&a_current)
                .then(b.attached.cmp(&a.attached))
                .then(b.last_activity.cmp(&a.last_activity))
        });

        Ok(sessions
            .into_iter()
            .map(|s| {
                let is_current = current.as_deref() == Some(s.name.as_str());
                let project = if s.path.as_os_str().is_empty() {
                    String::new()
                } else {
                    dir_name(&s.path)
                };
                Candidate::session(s.name, s.attached || is_current, project)
            })
            .collect())
    }

    fn create(&mut self, name: &str) -> Result<Candidate, SourceError> {
        let name = name.trim();
        validate_session_name(name).map_err(SourceError::Validation)?;
        if self.client.has_session(name)? {
            return Err(SourceError::Validation(format!(
                "Session '{}' already exists",
                name
            )));
        }
        self.client.new_session(name, self.default_dir.as_deref())?;
        self.find(name)?.ok_or_else(|| {
            SourceError::parse(TMUX, format!("session '{}' missing after creation", name))
        })
    }

    fn delete(&mut self, id: &str) -> Result<(), SourceError> {
        let Some(candidate) = self.find(id)? else {
            return Err(SourceError::NotFound(id.to_string()));
        };
        if candidate.is_protected() {
            return Err(SourceError::Validation(format!(
                "Cannot delete attached session '{}'",
                id
            )));
        }
        self.client.kill_session(id)
    }

    fn switch_to(&mut self, id: &str) -> Result<SwitchOutcome, SourceError> {
        if !self.client.has_session(id)? {
            return Err(SourceError::NotFound(id.to_string()));
        }
        self.client.switch_client(id)
    }
}
