//! Git worktree adapter.
//!
//! Worktrees are read from `git worktree list --porcelain` and switched to by
//! focusing a tmux session named after the worktree directory.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::tmux::{sanitize_session_name, TmuxClient};
use super::{dir_name, CandidateSource, CommandRunner, SourceError, SwitchOutcome};
use crate::candidate::{Candidate, Mode};
use crate::config::WorktreeConfig;

const GIT: &str = "git";

/// Length of the abbreviated commit shown next to a worktree
const SHORT_COMMIT_LEN: usize = 7;

/// Branches tried, in order, when the main worktree has to be found by branch.
const DEFAULT_MAIN_BRANCHES: [&str; 2] = ["main", "master"];

/// One stanza of `git worktree list --porcelain`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeRecord {
    pub path: PathBuf,
    pub head: String,
    /// Short branch name, without `refs/heads/`
    pub branch: Option<String>,
    pub is_bare: bool,
    pub is_detached: bool,
    pub is_prunable: bool,
}

impl WorktreeRecord {
    fn id(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn short_commit(&self) -> String {
        self.head.chars().take(SHORT_COMMIT_LEN).collect()
    }
}

/// Parse porcelain output. Stanzas are separated by blank lines and each
/// starts with a `worktree <path>` line.
pub fn parse_worktree_list(output: &str) -> Result<Vec<WorktreeRecord>, SourceError> {
    let mut records = Vec::new();
    let mut current: Option<WorktreeRecord> = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            records.extend(current.take());
            continue;
        }
        let (key, value) = line.split_once(' ').unwrap_or((line, ""));
        if key == "worktree" {
            records.extend(current.take());
            current = Some(WorktreeRecord {
                path: PathBuf::from(value),
                ..Default::default()
            });
            continue;
        }
        let Some(record) = current.as_mut() else {
            return Err(SourceError::parse(
                GIT,
                format!("{:?} appears before any worktree line", line),
            ));
        };
        match key {
            "HEAD" => record.head = value.to_string(),
            "branch" => {
                let short = value.strip_prefix("refs/heads/").unwrap_or(value);
                record.branch = Some(short.to_string());
            }
            "bare" => record.is_bare = true,
            "detached" => record.is_detached = true,
            "prunable" => record.is_prunable = true,
            // locked, and anything newer git adds
            _ => {}
        }
    }
    records.extend(current);
    Ok(records)
}

/// Validate a branch name against git's ref-name rules.
pub fn validate_branch_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Branch name cannot be empty".to_string());
    }
    let rules = [
        (name == "@", "Cannot be '@'"),
        (name.starts_with('-'), "Cannot start with '-'"),
        (name.starts_with('.'), "Cannot start with '.'"),
        (name.ends_with('.'), "Cannot end with '.'"),
        (name.ends_with('/'), "Cannot end with '/'"),
        (name.ends_with(".lock"), "Cannot end with '.lock'"),
        (name.contains(".."), "Cannot contain '..'"),
        (name.contains("//"), "Cannot contain '//'"),
        (name.contains("@{"), "Cannot contain '@{'"),
        (name.contains(' '), "Cannot contain spaces"),
        (
            name.contains(['~', '^', ':', '\\', '?', '*', '[']),
            "Cannot contain ~, ^, :, \\, ?, * or [",
        ),
        (
            name.chars().any(char::is_control),
            "Cannot contain control characters",
        ),
    ];
    match rules.iter().find(|(broken, _)| *broken) {
        Some((_, reason)) => Err((*reason).to_string()),
        None => Ok(()),
    }
}

/// A worktree looked up by id, with the main worktree alongside it.
struct Located {
    record: WorktreeRecord,
    is_main: bool,
    main: Option<WorktreeRecord>,
}

/// Worktree adapter: candidates are the worktrees of one repository, ids are paths.
pub struct GitWorktreeSource {
    runner: Rc<dyn CommandRunner>,
    tmux: TmuxClient,
    repo_dir: PathBuf,
    config: WorktreeConfig,
}

impl GitWorktreeSource {
    pub fn new(
        runner: Rc<dyn CommandRunner>,
        tmux: TmuxClient,
        repo_dir: PathBuf,
        config: WorktreeConfig,
    ) -> Self {
        Self {
            runner,
            tmux,
            repo_dir,
            config,
        }
    }

    /// Build a source for the repository containing `start`.
    ///
    /// Returns [`SourceError::Unavailable`] when `start` is not inside a repository.
    pub fn discover(
        runner: Rc<dyn CommandRunner>,
        tmux: TmuxClient,
        start: &Path,
        config: WorktreeConfig,
    ) -> Result<Self, SourceError> {
        let output = runner.run(GIT, &["rev-parse", "--git-dir"], Some(start))?;
        if !output.success {
            tracing::debug!(dir = %start.display(), stderr = %output.stderr.trim(), "no git repository");
            return Err(SourceError::Unavailable(format!(
                "{} is not inside a git repository",
                start.display()
            )));
        }
        Ok(Self::new(runner, tmux, start.to_path_buf(), config))
    }

    fn git(&self, args: &[&str], cwd: &Path) -> Result<String, SourceError> {
        self.runner.run(GIT, args, Some(cwd))?.into_stdout(GIT, args)
    }

    fn records(&self) -> Result<Vec<WorktreeRecord>, SourceError> {
        let stdout = self.git(&["worktree", "list", "--porcelain"], &self.repo_dir)?;
        parse_worktree_list(&stdout)
    }

    /// Index of the main worktree: the first entry, unless that is a bare
    /// repository, in which case the worktree holding the main branch.
    fn main_index(&self, records: &[WorktreeRecord]) -> Option<usize> {
        match records.first() {
            Some(first) if !first.is_bare => Some(0),
            _ => {
                let configured = self.config.main_branch.as_deref();
                let wanted: Vec<&str> = match configured {
                    Some(branch) => vec![branch],
                    None => DEFAULT_MAIN_BRANCHES.to_vec(),
                };
                wanted.iter().find_map(|branch| {
                    records
                        .iter()
                        .position(|r| !r.is_bare && r.branch.as_deref() == Some(*branch))
                })
            }
        }
    }

    /// Whether `MERGE_HEAD` exists in the worktree at `path`.
    fn merge_in_progress(&self, path: &Path) -> bool {
        self.runner
            .run(GIT, &["rev-parse", "-q", "--verify", "MERGE_HEAD"], Some(path))
            .is_ok_and(|output| output.success)
    }

    fn is_dirty(&self, path: &Path) -> Result<bool, SourceError> {
        Ok(!self.git(&["status", "--porcelain"], path)?.trim().is_empty())
    }

    fn locate(&self, id: &str) -> Result<Located, SourceError> {
        let records = self.records()?;
        let main_index = self.main_index(&records);
        let main = main_index.and_then(|i| records.get(i)).cloned();
        let (index, record) = records
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_bare && r.id() == id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        Ok(Located {
            record: record.clone(),
            is_main: Some(index) == main_index,
            main,
        })
    }

    /// The tmux session for the worktree at `path`, and whether it already exists.
    ///
    /// Sessions are named after the worktree directory. A session of that name
    /// rooted somewhere else is left alone and `-2`, `-3`, ... are tried instead.
    fn session_for(&self, path: &Path) -> Result<(String, bool), SourceError> {
        let base = sanitize_session_name(&dir_name(path));
        let sessions = self.tmux.list_sessions()?;
        let mut suffix = 1;
        loop {
            let name = if suffix == 1 {
                base.clone()
            } else {
                format!("{}-{}", base, suffix)
            };
            match sessions.iter().find(|s| s.name == name) {
                None => return Ok((name, false)),
                Some(session) if session.path.as_path() == path => return Ok((name, true)),
                Some(session) => {
                    tracing::debug!(
                        session = %name,
                        root = %session.path.display(),
                        "session name taken by another directory"
                    );
                    suffix += 1;
                }
            }
        }
    }

    /// Where a worktree for `branch` goes: inside a bare repository, or next
    /// to the main worktree as `<repo>-<branch>`.
    fn new_worktree_path(
        &self,
        records: &[WorktreeRecord],
        main: Option<usize>,
        branch: &str,
    ) -> Result<PathBuf, SourceError> {
        let leaf = branch.replace('/', "-");
        if let Some(bare) = records.iter().find(|r| r.is_bare) {
            return Ok(bare.path.join(leaf));
        }
        let main_path = main
            .and_then(|i| records.get(i))
            .map_or_else(|| self.repo_dir.clone(), |r| r.path.clone());
        let repo_name = dir_name(&main_path);
        main_path
            .parent()
            .map(|parent| parent.join(format!("{}-{}", repo_name, leaf)))
            .ok_or_else(|| {
                SourceError::Validation("Cannot determine parent directory for worktree".to_string())
            })
    }
}

impl CandidateSource for GitWorktreeSource {
    fn mode(&self) -> Mode {
        Mode::Worktree
    }

    fn list(&self) -> Result<Vec<Candidate>, SourceError> {
        let records = self.records()?;
        let main = self.main_index(&records);

        let mut candidates = Vec::with_capacity(records.len());
        let mut main_candidate = None;
        for (index, record) in records.iter().enumerate() {
            if record.is_bare || record.is_prunable {
                continue;
            }
            let is_dirty = self.is_dirty(&record.path).unwrap_or_else(|e| {
                tracing::warn!(path = %record.path.display(), error = %e, "could not read worktree status");
                false
            });
            let is_main = Some(index) == main;
            let candidate = Candidate::worktree(
                &record.path,
                record.branch.clone().unwrap_or_default(),
                record.short_commit(),
                is_dirty,
                is_main,
            );
            if is_main {
                main_candidate = Some(candidate);
            } else {
                candidates.push(candidate);
            }
        }
        candidates.extend(main_candidate);
        Ok(candidates)
    }

    fn create(&mut self, branch: &str) -> Result<Candidate, SourceError> {
        let branch = branch.trim();
        validate_branch_name(branch)
            .map_err(|reason| SourceError::Validation(format!("Invalid branch name: {}", reason)))?;

        let records = self.records()?;
        if records.iter().any(|r| r.branch.as_deref() == Some(branch)) {
            return Err(SourceError::Validation(format!(
                "Branch '{}' is already checked out",
                branch
            )));
        }
        let main = self.main_index(&records);
        let path = self.new_worktree_path(&records, main, branch)?;
        if path.exists() {
            return Err(SourceError::Validation(format!(
                "Path already exists: {}",
                path.display()
            )));
        }

        let id = path.to_string_lossy().into_owned();
        let args = ["worktree", "add", "-b", branch, id.as_str()];
        let output = self.runner.run(GIT, &args, Some(&self.repo_dir))?;
        if !output.success {
            if output.stderr.contains("already exists") {
                return Err(SourceError::Validation(format!(
                    "Branch '{}' already exists",
                    branch
                )));
            }
            return Err(output.into_error(GIT, &args));
        }
        tracing::info!(branch, path = %id, "created worktree");

        self.list()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| SourceError::parse(GIT, format!("worktree {} missing after creation", id)))
    }

    fn delete(&mut self, id: &str) -> Result<(), SourceError> {
        let Located {
            record, is_main, ..
        } = self.locate(id)?;
        if is_main {
            return Err(SourceError::Validation(
                "Cannot delete the main worktree".to_string(),
            ));
        }
        let dirty = self.is_dirty(&record.path)?;
        if dirty && !self.config.allow_dirty_delete {
            return Err(SourceError::Validation(format!(
                "'{}' has uncommitted changes",
                dir_name(&record.path)
            )));
        }

        let mut args = vec!["worktree", "remove"];
        if dirty {
            args.push("--force");
        }
        args.push(id);
        self.git(&args, &self.repo_dir)?;
        tracing::info!(path = id, forced = dirty, "removed worktree");

        if self.config.delete_branch {
            if let Some(branch) = record.branch.as_deref() {
                match self.git(&["branch", "-d", branch], &self.repo_dir) {
                    Ok(_) => tracing::info!(branch, "deleted branch"),
                    Err(e) => tracing::warn!(branch, error = %e, "could not delete branch"),
                }
            }
        }
        Ok(())
    }

    fn switch_to(&mut self, id: &str) -> Result<SwitchOutcome, SourceError> {
        let Located { record, .. } = self.locate(id)?;
        let (session, exists) = self.session_for(&record.path)?;
        if !exists {
            self.tmux.new_session(&session, Some(&record.path))?;
        }
        self.tmux.switch_client(&session)
    }

    fn merge(&mut self, id: &str) -> Result<(), SourceError> {
        let Located {
            record,
            is_main,
            main,
        } = self.locate(id)?;
        if is_main {
            return Err(SourceError::Validation(
                "Cannot merge the main worktree into itself".to_string(),
            ));
        }
        let Some(branch) = record.branch.clone() else {
            return Err(SourceError::Validation(format!(
                "'{}' has a detached HEAD; there is no branch to merge",
                dir_name(&record.path)
            )));
        };
        let Some(main) = main else {
            return Err(SourceError::Unavailable(
                "No main worktree to merge into".to_string(),
            ));
        };
        for path in [&record.path, &main.path] {
            if self.is_dirty(path)? {
                return Err(SourceError::DirtyTree(dir_name(path)));
            }
        }

        let args = ["merge", "--no-ff", "--no-edit", branch.as_str()];
        let output = self.runner.run(GIT, &args, Some(&main.path))?;
        if output.success {
            tracing::info!(branch = %branch, into = %main.path.display(), "merged worktree branch");
            return Ok(());
        }

        let unmerged = self.git(&["diff", "--name-only", "--diff-filter=U"], &main.path);
        let files: Vec<String> = match &unmerged {
            Ok(stdout) => stdout
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "could not list unmerged files");
                Vec::new()
            }
        };
        // never leave the main worktree mid-merge
        if unmerged.is_err() || !files.is_empty() || self.merge_in_progress(&main.path) {
            if let Err(e) = self.git(&["merge", "--abort"], &main.path) {
                tracing::warn!(error = %e, "could not abort failed merge");
            }
        }
        if files.is_empty() {
            return Err(output.into_error(GIT, &args));
        }
        tracing::warn!(branch = %branch, files = ?files, "merge conflicted and was aborted");
        Err(SourceError::Conflict { branch, files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Annotations;
    use crate::source::fake::{failure, success, FakeRunner};

    const LISTING: &str = "worktree /work/repo
HEAD 1111111aaaaaaaaaaaa
branch refs/heads/main

worktree /work/repo-feature
HEAD 2222222bbbbbbbbbbbb
branch refs/heads/feature

worktree /work/repo-spike
HEAD 3333333cccccccccccc
detached

";

    const BARE_LISTING: &str = "worktree /work/repo.git
bare

worktree /work/repo.git/feature
HEAD 2222222bbbbbbbbbbbb
branch refs/heads/feature

worktree /work/repo.git/main
HEAD 1111111aaaaaaaaaaaa
branch refs/heads/main

worktree /work/repo.git/stale
HEAD 4444444dddddddddddd
branch refs/heads/stale
prunable gitdir file points to non-existent location
";

    fn source_with(runner: &Rc<FakeRunner>, config: WorktreeConfig) -> GitWorktreeSource {
        let tmux = TmuxClient::new(runner.clone(), true);
        GitWorktreeSource::new(runner.clone(), tmux, PathBuf::from("/work/repo"), config)
    }

    fn source(runner: &Rc<FakeRunner>) -> GitWorktreeSource {
        source_with(runner, WorktreeConfig::default())
    }

    /// A runner that lists [`LISTING`] with every worktree clean.
    fn clean_repo() -> Rc<FakeRunner> {
        let runner = Rc::new(FakeRunner::new());
        runner.on("git worktree list", success(LISTING));
        runner
    }

    #[test]
    fn parse_reads_branches_heads_and_flags() {
        let records = parse_worktree_list(LISTING).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].path, PathBuf::from("/work/repo"));
        assert_eq!(records[0].branch.as_deref(), Some("main"));
        assert_eq!(records[1].short_commit(), "2222222");
        assert!(records[2].is_detached);
        assert_eq!(records[2].branch, None);
    }

    #[test]
    fn parse_handles_bare_and_prunable_entries_without_trailing_blank() {
        let records = parse_worktree_list(BARE_LISTING).unwrap();
        assert_eq!(records.len(), 4);
        assert!(records[0].is_bare);
        assert!(records[3].is_prunable);
    }

    #[test]
    fn parse_rejects_attributes_outside_a_stanza() {
        let err = parse_worktree_list("HEAD 123\n").unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[test]
    fn validate_branch_name_accepts_common_names() {
        for name in ["feature-branch", "feature/add-login", "fix-123", "my_branch"] {
            assert!(validate_branch_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn validate_branch_name_rejects_what_git_rejects() {
        for name in [
            "",
            "-starts-with-dash",
            ".starts-with-dot",
            "ends-with-dot.",
            "ends-with-slash/",
            "has..double-dots",
            "has//double-slash",
            "has space",
            "has~tilde",
            "has^caret",
            "has:colon",
            "has\\backslash",
            "has?question",
            "has@{at-brace",
            "@",
            "branch.lock",
            "tab\there",
        ] {
            assert!(validate_branch_name(name).is_err(), "{name:?} should be invalid");
        }
    }

    #[test]
    fn list_puts_the_main_worktree_last_and_marks_dirty_ones() {
        let runner = Rc::new(FakeRunner::new());
        runner.on("git worktree list", success(LISTING));
        runner.on_in("git status", "/work/repo-feature", success(" M src/lib.rs\n"));
        runner.on("git status", success(""));

        let candidates = source(&runner).list().unwrap();
        let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["feature", "repo-spike", "main"]);
        assert_eq!(
            candidates[0].annotations,
            Annotations::Worktree {
                branch: "feature".to_string(),
                short_commit: "2222222".to_string(),
                is_dirty: true,
                is_main: false,
            }
        );
        assert!(candidates[2].is_protected());
        assert!(!candidates[1].is_dirty());
    }

    #[test]
    fn list_in_a_bare_layout_finds_main_by_branch_and_skips_prunable() {
        let runner = Rc::new(FakeRunner::new());
        runner.on("git worktree list", success(BARE_LISTING));
        runner.on("git status", success(""));

        let candidates = source(&runner).list().unwrap();
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["/work/repo.git/feature", "/work/repo.git/main"]);
        assert!(candidates[1].is_protected());
    }

    #[test]
    fn configured_main_branch_wins_in_a_bare_layout() {
        let runner = Rc::new(FakeRunner::new());
        runner.on("git worktree list", success(BARE_LISTING));
        runner.on("git status", success(""));
        let config = WorktreeConfig {
            main_branch: Some("feature".to_string()),
            ..WorktreeConfig::default()
        };

        let candidates = source_with(&runner, config).list().unwrap();
        assert_eq!(candidates.last().unwrap().id, "/work/repo.git/feature");
    }

    #[test]
    fn discover_outside_a_repository_is_unavailable() {
        let runner = Rc::new(FakeRunner::new());
        runner.on("git rev-parse", failure("fatal: not a git repository"));
        let tmux = TmuxClient::new(runner.clone(), false);
        let result = GitWorktreeSource::discover(
            runner.clone(),
            tmux,
            Path::new("/tmp"),
            WorktreeConfig::default(),
        );
        assert!(matches!(result, Err(SourceError::Unavailable(_))));
    }

    #[test]
    fn create_adds_a_sibling_worktree_and_returns_it() {
        let runner = Rc::new(FakeRunner::new());
        runner.on_once("git worktree list", success(LISTING));
        runner.on(
            "git worktree list",
            success(&format!(
                "{}worktree /work/repo-feat-login\nHEAD 5555555eeeeeee\nbranch refs/heads/feat/login\n",
                LISTING
            )),
        );
        runner.on("git worktree add -b feat/login /work/repo-feat-login", success(""));
        runner.on("git status", success(""));

        let created = source(&runner).create("feat/login").unwrap();
        assert_eq!(created.id, "/work/repo-feat-login");
        assert_eq!(created.label, "feat/login");
        assert_eq!(created.branch(), Some("feat/login"));
    }

    #[test]
    fn create_inside_a_bare_repository_nests_the_worktree() {
        let runner = Rc::new(FakeRunner::new());
        runner.on_once("git worktree list", success(BARE_LISTING));
        runner.on(
            "git worktree list",
            success(&format!(
                "{}\nworktree /work/repo.git/bugfix\nHEAD 5555555eeeeeee\nbranch refs/heads/bugfix\n",
                BARE_LISTING
            )),
        );
        runner.on("git worktree add -b bugfix /work/repo.git/bugfix", success(""));
        runner.on("git status", success(""));

        let created = source(&runner).create("bugfix").unwrap();
        assert_eq!(created.id, "/work/repo.git/bugfix");
    }

    #[test]
    fn create_rejects_invalid_names_before_running_git() {
        let runner = Rc::new(FakeRunner::new());
        let err = source(&runner).create("has space").unwrap_err();
        assert!(matches!(err, SourceError::Validation(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn create_rejects_a_branch_that_is_already_checked_out() {
        let runner = clean_repo();
        let err = source(&runner).create("feature").unwrap_err();
        assert!(matches!(err, SourceError::Validation(_)));
        assert!(!runner.was_called("git worktree add"));
    }

    #[test]
    fn create_rejects_an_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let main = tmp.path().join("repo");
        std::fs::create_dir_all(tmp.path().join("repo-taken")).unwrap();
        let runner = Rc::new(FakeRunner::new());
        runner.on(
            "git worktree list",
            success(&format!(
                "worktree {}\nHEAD 1111111aaaa\nbranch refs/heads/main\n",
                main.display()
            )),
        );

        let err = source(&runner).create("taken").unwrap_err();
        assert!(matches!(err, SourceError::Validation(ref m) if m.starts_with("Path already exists")));
        assert!(!runner.was_called("git worktree add"));
    }

    #[test]
    fn create_reports_an_existing_branch_as_validation() {
        let runner = clean_repo();
        runner.on(
            "git worktree add",
            failure("fatal: a branch named 'old' already exists"),
        );
        let err = source(&runner).create("old").unwrap_err();
        assert!(matches!(err, SourceError::Validation(_)));
    }

    #[test]
    fn delete_refuses_the_main_worktree_without_removing_anything() {
        let runner = clean_repo();
        let err = source(&runner).delete("/work/repo").unwrap_err();
        assert!(matches!(err, SourceError::Validation(_)));
        assert!(!runner.was_called("git worktree remove"));
    }

    #[test]
    fn delete_of_a_vanished_worktree_is_not_found() {
        let runner = clean_repo();
        let err = source(&runner).delete("/work/gone").unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn delete_refuses_a_dirty_worktree_by_default() {
        let runner = clean_repo();
        runner.on("git status", success("?? notes.txt\n"));
        let err = source(&runner).delete("/work/repo-feature").unwrap_err();
        assert!(matches!(err, SourceError::Validation(_)));
        assert!(!runner.was_called("git worktree remove"));
    }

    #[test]
    fn delete_forces_a_dirty_worktree_when_allowed() {
        let runner = clean_repo();
        runner.on("git status", success("?? notes.txt\n"));
        runner.on("git worktree remove --force /work/repo-feature", success(""));
        let config = WorktreeConfig {
            allow_dirty_delete: true,
            ..WorktreeConfig::default()
        };
        source_with(&runner, config).delete("/work/repo-feature").unwrap();
        assert!(runner.was_called("git worktree remove --force /work/repo-feature"));
    }

    #[test]
    fn delete_can_remove_the_branch_and_tolerates_failure() {
        let runner = clean_repo();
        runner.on("git status", success(""));
        runner.on("git worktree remove /work/repo-feature", success(""));
        runner.on("git branch -d feature", failure("error: branch 'feature' is not fully merged"));
        let config = WorktreeConfig {
            delete_branch: true,
            ..WorktreeConfig::default()
        };
        source_with(&runner, config).delete("/work/repo-feature").unwrap();
        assert!(runner.was_called("git branch -d feature"));
    }

    #[test]
    fn switch_creates_a_session_rooted_at_the_worktree() {
        let runner = clean_repo();
        runner.on("tmux list-sessions", success(""));
        runner.on("tmux new-session -d -s repo-feature -c /work/repo-feature", success(""));
        runner.on("tmux display-message", success("repo\n"));
        runner.on("tmux switch-client -t =repo-feature", success(""));

        let outcome = source(&runner).switch_to("/work/repo-feature").unwrap();
        assert_eq!(
            outcome,
            SwitchOutcome::Switched {
                session: "repo-feature".to_string()
            }
        );
        assert!(runner.was_called("tmux new-session -d -s repo-feature -c /work/repo-feature"));
    }

    #[test]
    fn switch_reuses_an_existing_session() {
        let runner = clean_repo();
        runner.on("tmux list-sessions", success("repo-spike\t1\t/work/repo-spike\t10\n"));
        runner.on("tmux display-message", success("repo-spike\n"));

        let outcome = source(&runner).switch_to("/work/repo-spike").unwrap();
        assert_eq!(
            outcome,
            SwitchOutcome::AlreadyActive {
                session: "repo-spike".to_string()
            }
        );
        assert!(!runner.was_called("tmux new-session"));
    }

    #[test]
    fn switch_does_not_reuse_a_same_named_session_from_another_repository() {
        let runner = Rc::new(FakeRunner::new());
        runner.on("git worktree list", success(BARE_LISTING));
        runner.on(
            "tmux list-sessions",
            success("feature\t0\t/work/other.git/feature\t1\n"),
        );
        runner.on("tmux new-session -d -s feature-2 -c /work/repo.git/feature", success(""));
        runner.on("tmux display-message", success("notes\n"));
        runner.on("tmux switch-client -t =feature-2", success(""));

        let outcome = source(&runner).switch_to("/work/repo.git/feature").unwrap();
        assert_eq!(
            outcome,
            SwitchOutcome::Switched {
                session: "feature-2".to_string()
            }
        );
        assert!(runner.was_called("tmux new-session -d -s feature-2 -c /work/repo.git/feature"));
        assert!(!runner
            .calls()
            .iter()
            .any(|c| c == "tmux switch-client -t =feature"));
    }

    #[test]
    fn switch_reuses_the_suffixed_session_rooted_at_the_worktree() {
        let runner = Rc::new(FakeRunner::new());
        runner.on("git worktree list", success(BARE_LISTING));
        runner.on(
            "tmux list-sessions",
            success("feature\t0\t/work/other.git/feature\t1\nfeature-2\t0\t/work/repo.git/feature\t2\n"),
        );
        runner.on("tmux display-message", success("notes\n"));
        runner.on("tmux switch-client -t =feature-2", success(""));

        source(&runner).switch_to("/work/repo.git/feature").unwrap();
        assert!(!runner.was_called("tmux new-session"));
        assert!(runner.was_called("tmux switch-client -t =feature-2"));
    }

    #[test]
    fn merge_refuses_a_dirty_tree_without_merging() {
        let runner = clean_repo();
        runner.on_in("git status", "/work/repo-feature", success(" M a.rs\n"));
        runner.on("git status", success(""));
        let err = source(&runner).merge("/work/repo-feature").unwrap_err();
        assert!(matches!(err, SourceError::DirtyTree(ref name) if name == "repo-feature"));
        assert!(!runner.was_called("git merge"));
    }

    #[test]
    fn merge_refuses_when_the_main_worktree_is_dirty() {
        let runner = clean_repo();
        runner.on_in("git status", "/work/repo", success(" M Cargo.lock\n"));
        runner.on("git status", success(""));
        let err = source(&runner).merge("/work/repo-feature").unwrap_err();
        assert!(matches!(err, SourceError::DirtyTree(ref name) if name == "repo"));
    }

    #[test]
    fn merge_runs_in_the_main_worktree() {
        let runner = clean_repo();
        runner.on("git status", success(""));
        runner.on("git merge --no-ff --no-edit feature", success("Merge made\n"));
        source(&runner).merge("/work/repo-feature").unwrap();
        assert!(runner.was_called("git merge --no-ff --no-edit feature @ /work/repo"));
    }

    #[test]
    fn merge_conflict_is_aborted_and_lists_the_files() {
        let runner = clean_repo();
        runner.on("git status", success(""));
        runner.on("git merge --no-ff", failure("CONFLICT (content): Merge conflict in src/lib.rs"));
        runner.on("git diff --name-only --diff-filter=U", success("src/lib.rs\nREADME.md\n"));
        runner.on("git merge --abort", success(""));

        let err = source(&runner).merge("/work/repo-feature").unwrap_err();
        match err {
            SourceError::Conflict { branch, files } => {
                assert_eq!(branch, "feature");
                assert_eq!(files, vec!["src/lib.rs", "README.md"]);
            }
            other => panic!("expected a conflict, got {other:?}"),
        }
        assert!(runner.was_called("git merge --abort"));
    }

    #[test]
    fn merge_is_aborted_when_unmerged_files_cannot_be_listed() {
        let runner = clean_repo();
        runner.on("git status", success(""));
        runner.on("git merge --no-ff", failure("CONFLICT (content): Merge conflict in a.rs"));
        runner.on("git diff --name-only", failure("fatal: index file corrupt"));
        runner.on("git merge --abort", success(""));

        let err = source(&runner).merge("/work/repo-feature").unwrap_err();
        assert!(matches!(err, SourceError::Command { .. }), "got {err:?}");
        assert!(runner.was_called("git merge --abort @ /work/repo"));
    }

    #[test]
    fn merge_failure_with_merge_head_left_behind_is_aborted() {
        let runner = clean_repo();
        runner.on("git status", success(""));
        runner.on("git merge --no-ff", failure("error: could not write index"));
        runner.on("git diff --name-only", success(""));
        runner.on("git rev-parse -q --verify MERGE_HEAD", success("2222222\n"));
        runner.on("git merge --abort", success(""));

        let err = source(&runner).merge("/work/repo-feature").unwrap_err();
        assert!(matches!(err, SourceError::Command { .. }), "got {err:?}");
        assert!(runner.was_called("git merge --abort"));
    }

    #[test]
    fn merge_failure_without_a_merge_in_progress_leaves_main_alone() {
        let runner = clean_repo();
        runner.on("git status", success(""));
        runner.on("git merge --no-ff", failure("merge: feature - not something we can merge"));
        runner.on("git diff --name-only", success(""));
        runner.on("git rev-parse -q --verify MERGE_HEAD", failure(""));

        let err = source(&runner).merge("/work/repo-feature").unwrap_err();
        assert!(matches!(err, SourceError::Command { .. }), "got {err:?}");
        assert!(!runner.was_called("git merge --abort"));
    }

    #[test]
    fn merge_rejects_main_and_detached_worktrees() {
        let runner = clean_repo();
        let mut source = source(&runner);
        assert!(matches!(
            source.merge("/work/repo"),
            Err(SourceError::Validation(_))
        ));
        assert!(matches!(
            source.merge("/work/repo-spike"),
            Err(SourceError::Validation(_))
        ));
        assert!(!runner.was_called("git merge"));
    }
}
