//! Process execution seam shared by the tmux and git adapters.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::SourceError;

/// How often a bounded wait checks whether the child has exited
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Return stdout on success, or a [`SourceError::Command`] describing the failure.
    pub fn into_stdout(self, program: &str, args: &[&str]) -> Result<String, SourceError> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(self.into_error(program, args))
        }
    }

    fn from_parts(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    pub fn into_error(self, program: &str, args: &[&str]) -> SourceError {
        SourceError::Command {
            program: program.to_string(),
            args: args.join(" "),
            code: self.code,
            stderr: self.stderr.trim().to_string(),
        }
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self::from_parts(output.status, &output.stdout, &output.stderr)
    }
}

/// Runs external programs. Adapters only ever talk to tmux and git through this.
pub trait CommandRunner {
    /// Run `program` with `args`, optionally inside `cwd`, and capture its output.
    ///
    /// A non-zero exit is not an error at this level; callers decide what a
    /// failure means. Only spawn failures and timeouts return `Err`.
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>)
        -> Result<CommandOutput, SourceError>;
}

/// Spawns real processes, with an optional upper bound on how long each may run.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, SourceError> {
        tracing::debug!(program, args = ?args, cwd = ?cwd, "running command");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let spawn_error = |source: std::io::Error| SourceError::Spawn {
            program: program.to_string(),
            source,
        };
        let child = command.spawn().map_err(spawn_error)?;

        let output: CommandOutput = match self.timeout {
            None => child.wait_with_output().map_err(spawn_error)?.into(),
            Some(limit) => wait_bounded(child, program, limit)?,
        };

        if !output.success {
            tracing::debug!(
                program,
                code = ?output.code,
                stderr = %output.stderr.trim(),
                "command exited unsuccessfully"
            );
        }
        Ok(output)
    }
}

/// Wait for `child`, killing it once `limit` has passed.
fn wait_bounded(
    mut child: Child,
    program: &str,
    limit: Duration,
) -> Result<CommandOutput, SourceError> {
    // Drain both pipes on their own threads so a chatty child cannot block on a full pipe.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = thread::spawn(move || drain(stdout));
    let stderr_reader = thread::spawn(move || drain(stderr));

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= limit => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program, after_secs = limit.as_secs(), "command timed out");
                return Err(SourceError::Timeout {
                    program: program.to_string(),
                    after: limit,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                return Err(SourceError::Spawn {
                    program: program.to_string(),
                    source,
                })
            }
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();
    Ok(CommandOutput::from_parts(status, &stdout, &stderr))
}

fn drain(pipe: Option<impl Read>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_stdout_returns_output_on_success() {
        let output = CommandOutput {
            success: true,
            code: Some(0),
            stdout: "hello\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.into_stdout("tmux", &["ls"]).unwrap(), "hello\n");
    }

    #[test]
    fn into_stdout_describes_failures() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: "can't find session: nope\n".to_string(),
        };
        let err = output
            .into_stdout("tmux", &["kill-session", "-t", "=nope"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "`tmux kill-session -t =nope` failed with exit code 1: can't find session: nope"
        );
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stdout() {
        let runner = SystemRunner::default();
        let output = runner.run("sh", &["-c", "printf ok"], None).unwrap();
        assert!(output.success);
        assert_eq!(output.stdout, "ok");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_missing_programs_as_spawn_errors() {
        let runner = SystemRunner::default();
        let err = runner
            .run("muxpick-definitely-not-a-real-program", &[], None)
            .unwrap_err();
        assert!(matches!(err, SourceError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_kills_commands_that_exceed_the_timeout() {
        let runner = SystemRunner::new(Some(Duration::from_millis(100)));
        let err = runner.run("sleep", &["5"], None).unwrap_err();
        assert!(matches!(err, SourceError::Timeout { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_with_timeout_still_captures_output() {
        let runner = SystemRunner::new(Some(Duration::from_secs(5)));
        let output = runner
            .run("sh", &["-c", "printf out; printf err >&2; exit 3"], None)
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
    }
}
