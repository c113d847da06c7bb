//! Test doubles: a scripted command runner and a recording candidate source.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{CandidateSource, CommandOutput, CommandRunner, SourceError, SwitchOutcome};
use crate::candidate::{Candidate, Mode};

pub(crate) fn success(stdout: &str) -> CommandOutput {
    CommandOutput {
        success: true,
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub(crate) fn failure(stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

struct Rule {
    prefix: String,
    cwd: Option<PathBuf>,
    output: CommandOutput,
    once: bool,
    used: bool,
}

/// Answers commands from prefix rules, first match wins, and records every call.
#[derive(Default)]
pub(crate) struct FakeRunner {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, prefix: &str, cwd: Option<&str>, output: CommandOutput, once: bool) {
        self.rules.borrow_mut().push(Rule {
            prefix: prefix.to_string(),
            cwd: cwd.map(PathBuf::from),
            output,
            once,
            used: false,
        });
    }

    pub(crate) fn on(&self, prefix: &str, output: CommandOutput) {
        self.push(prefix, None, output, false);
    }

    /// Answer only the first matching call; later calls fall through to other rules.
    pub(crate) fn on_once(&self, prefix: &str, output: CommandOutput) {
        self.push(prefix, None, output, true);
    }

    /// Answer only calls made inside `cwd`.
    pub(crate) fn on_in(&self, prefix: &str, cwd: &str, output: CommandOutput) {
        self.push(prefix, Some(cwd), output, false);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn was_called(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }
}

impl CommandRunner for FakeRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, SourceError> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        let recorded = match cwd {
            Some(dir) => format!("{} @ {}", line, dir.display()),
            None => line.clone(),
        };
        self.calls.borrow_mut().push(recorded.clone());

        let mut rules = self.rules.borrow_mut();
        let rule = rules.iter_mut().find(|r| {
            !(r.once && r.used)
                && line.starts_with(&r.prefix)
                && r.cwd.as_deref().map_or(true, |c| Some(c) == cwd)
        });
        match rule {
            Some(rule) => {
                rule.used = true;
                Ok(rule.output.clone())
            }
            None => panic!("no fake response for `{}`", recorded),
        }
    }
}

/// One recorded adapter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SpyCall {
    List,
    Create(String),
    Delete(String),
    SwitchTo(String),
    Merge(String),
}

/// Shared, inspectable state behind a [`SpySource`].
pub(crate) struct SpyState {
    pub candidates: Vec<Candidate>,
    pub calls: Vec<SpyCall>,
    pub active: Option<String>,
    pub merge_error: Option<fn(&str) -> SourceError>,
    pub list_error: bool,
}

impl SpyState {
    /// Calls other than `list`.
    pub(crate) fn action_calls(&self) -> Vec<SpyCall> {
        self.calls
            .iter()
            .filter(|c| **c != SpyCall::List)
            .cloned()
            .collect()
    }
}

/// In-memory source that records every call. Tests keep the state handle to
/// inspect calls or to mutate the "live" set behind the picker's back.
pub(crate) struct SpySource {
    mode: Mode,
    state: Rc<RefCell<SpyState>>,
}

impl SpySource {
    pub(crate) fn new(mode: Mode, candidates: Vec<Candidate>) -> (Self, Rc<RefCell<SpyState>>) {
        let state = Rc::new(RefCell::new(SpyState {
            candidates,
            calls: Vec::new(),
            active: None,
            merge_error: None,
            list_error: false,
        }));
        (
            Self {
                mode,
                state: state.clone(),
            },
            state,
        )
    }
}

impl CandidateSource for SpySource {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn list(&self) -> Result<Vec<Candidate>, SourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(SpyCall::List);
        if state.list_error {
            return Err(SourceError::parse("spy", "listing failed"));
        }
        Ok(state.candidates.clone())
    }

    fn create(&mut self, name: &str) -> Result<Candidate, SourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(SpyCall::Create(name.to_string()));
        let name = name.trim();
        if name.is_empty() || name.contains(' ') {
            return Err(SourceError::Validation(format!("Invalid name '{}'", name)));
        }
        if state.candidates.iter().any(|c| c.label == name) {
            return Err(SourceError::Validation(format!("'{}' already exists", name)));
        }
        let candidate = match self.mode {
            Mode::Session => Candidate::session(name, false, "spy"),
            Mode::Worktree => Candidate::worktree(
                Path::new(&format!("/work/{}", name)),
                name,
                "0000000",
                false,
                false,
            ),
        };
        state.candidates.push(candidate.clone());
        Ok(candidate)
    }

    fn delete(&mut self, id: &str) -> Result<(), SourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(SpyCall::Delete(id.to_string()));
        let Some(index) = state.candidates.iter().position(|c| c.id == id) else {
            return Err(SourceError::NotFound(id.to_string()));
        };
        if state.candidates[index].is_protected() {
            return Err(SourceError::Validation("protected".to_string()));
        }
        state.candidates.remove(index);
        Ok(())
    }

    fn switch_to(&mut self, id: &str) -> Result<SwitchOutcome, SourceError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(SpyCall::SwitchTo(id.to_string()));
        if !state.candidates.iter().any(|c| c.id == id) {
            return Err(SourceError::NotFound(id.to_string()));
        }
        let session = id.to_string();
        if state.active.as_deref() == Some(id) {
            return Ok(SwitchOutcome::AlreadyActive { session });
        }
        state.active = Some(session.clone());
        Ok(SwitchOutcome::Switched { session })
    }

    fn merge(&mut self, id: &str) -> Result<(), SourceError> {
        if self.mode != Mode::Worktree {
            return Err(SourceError::Unsupported {
                operation: "merge",
                mode: self.mode,
            });
        }
        let mut state = self.state.borrow_mut();
        state.calls.push(SpyCall::Merge(id.to_string()));
        if let Some(make_error) = state.merge_error {
            return Err(make_error(id));
        }
        if !state.candidates.iter().any(|c| c.id == id) {
            return Err(SourceError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
