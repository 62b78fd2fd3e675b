//! File-open and command-execution collaborators.
//!
//! Both run as tokio child processes. The shell never waits on them: outcomes are
//! sent back over a channel that the UI loop drains once per frame.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::error::ExternalCommandError;

/// Longest stderr excerpt carried into an error dialog.
const MAX_STDERR_CHARS: usize = 400;

/// Exit status POSIX shells use for "command not found".
const SHELL_NOT_FOUND: i32 = 127;

/// What happened to one external request.
#[derive(Debug)]
pub struct ExternalOutcome {
    pub description: String,
    pub result: Result<(), ExternalCommandError>,
}

pub trait ExternalRunner {
    /// Open `path` with the platform default handler.
    fn open_path(&mut self, path: &Path);

    /// Run `command` through the platform shell.
    fn run_command(&mut self, command: &str);

    /// Failures that arrived since the last call. Never blocks.
    fn drain_failures(&mut self) -> Vec<ExternalCommandError>;
}

/// Program and leading args used to run a command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProgram {
    pub program: PathBuf,
    pub args: Vec<String>,
}

#[cfg(windows)]
#[must_use]
pub fn detect_shell() -> ShellProgram {
    ShellProgram {
        program: "cmd.exe".into(),
        args: vec!["/C".to_string()],
    }
}

#[cfg(not(windows))]
#[must_use]
pub fn detect_shell() -> ShellProgram {
    if let Ok(shell) = std::env::var("SHELL")
        && Path::new(&shell).exists()
    {
        return ShellProgram {
            program: PathBuf::from(shell),
            args: vec!["-c".to_string()],
        };
    }
    ShellProgram {
        program: "sh".into(),
        args: vec!["-c".to_string()],
    }
}

/// Program and leading args of the platform file-open handler.
#[must_use]
pub fn open_handler() -> ShellProgram {
    if cfg!(windows) {
        ShellProgram {
            program: "cmd".into(),
            args: vec!["/C".to_string(), "start".to_string(), String::new()],
        }
    } else if cfg!(target_os = "macos") {
        ShellProgram {
            program: "open".into(),
            args: Vec::new(),
        }
    } else {
        ShellProgram {
            program: "xdg-open".into(),
            args: Vec::new(),
        }
    }
}

/// Runs collaborators as child processes on the given runtime.
#[derive(Debug)]
pub struct ProcessRunner {
    runtime: Handle,
    shell: ShellProgram,
    opener: ShellProgram,
    tx: mpsc::UnboundedSender<ExternalOutcome>,
    rx: mpsc::UnboundedReceiver<ExternalOutcome>,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self::with_programs(runtime, detect_shell(), open_handler())
    }

    #[must_use]
    pub fn with_programs(runtime: Handle, shell: ShellProgram, opener: ShellProgram) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            shell,
            opener,
            tx,
            rx,
        }
    }

    /// Wait for the next outcome, successful or not.
    pub async fn next_outcome(&mut self) -> Option<ExternalOutcome> {
        self.rx.recv().await
    }

    fn report(&self, description: String, result: Result<(), ExternalCommandError>) {
        // The receiver lives in `self`, so this only fails while dropping.
        let _ = self.tx.send(ExternalOutcome {
            description,
            result,
        });
    }

    fn spawn(&self, description: String, program: PathBuf, args: Vec<String>, not_found_hint: String) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = run_to_completion(&description, &program, &args, &not_found_hint).await;
            let _ = tx.send(ExternalOutcome {
                description,
                result,
            });
        });
    }
}

async fn run_to_completion(
    description: &str,
    program: &Path,
    args: &[String],
    not_found_hint: &str,
) -> Result<(), ExternalCommandError> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ExternalCommandError::NotFound {
                    program: program.display().to_string(),
                }
            } else {
                ExternalCommandError::Spawn {
                    command: description.to_string(),
                    source,
                }
            }
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = excerpt(&String::from_utf8_lossy(&output.stderr));
    if output.status.code() == Some(SHELL_NOT_FOUND) {
        return Err(ExternalCommandError::NotFound {
            program: not_found_hint.to_string(),
        });
    }
    Err(ExternalCommandError::NonZeroExit {
        command: description.to_string(),
        status: describe_status(output.status),
        stderr,
    })
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.chars().count() <= MAX_STDERR_CHARS {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_STDERR_CHARS).collect();
    cut.push('…');
    cut
}

impl ExternalRunner for ProcessRunner {
    fn open_path(&mut self, path: &Path) {
        let description = format!("open {}", path.display());
        if !path.exists() {
            tracing::error!(path = %path.display(), "File not found");
            self.report(
                description,
                Err(ExternalCommandError::PathNotFound {
                    path: path.to_path_buf(),
                }),
            );
            return;
        }
        if which::which(&self.opener.program).is_err() {
            tracing::error!(handler = %self.opener.program.display(), "No file-open handler");
            self.report(
                description,
                Err(ExternalCommandError::HandlerMissing {
                    handler: self.opener.program.display().to_string(),
                }),
            );
            return;
        }

        let mut args = self.opener.args.clone();
        args.push(path.display().to_string());
        let hint = self.opener.program.display().to_string();
        self.spawn(description, self.opener.program.clone(), args, hint);
    }

    fn run_command(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() {
            self.report(String::new(), Err(ExternalCommandError::Empty));
            return;
        }
        let mut args = self.shell.args.clone();
        args.push(command.to_string());
        let hint = command
            .split_whitespace()
            .next()
            .unwrap_or(command)
            .to_string();
        tracing::info!(command, "Running command");
        self.spawn(command.to_string(), self.shell.program.clone(), args, hint);
    }

    fn drain_failures(&mut self) -> Vec<ExternalCommandError> {
        let mut failures = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            match outcome.result {
                Ok(()) => tracing::debug!(command = %outcome.description, "External command finished"),
                Err(e) => {
                    tracing::error!(command = %outcome.description, "External command failed: {e}");
                    failures.push(e);
                }
            }
        }
        failures
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> ProcessRunner {
        ProcessRunner::with_programs(
            Handle::current(),
            ShellProgram {
                program: "sh".into(),
                args: vec!["-c".to_string()],
            },
            ShellProgram {
                program: "true".into(),
                args: Vec::new(),
            },
        )
    }

    #[tokio::test]
    async fn successful_command_reports_ok() {
        let mut runner = runner();
        runner.run_command("exit 0");
        let outcome = runner.next_outcome().await.unwrap();
        assert_eq!(outcome.description, "exit 0");
        assert!(outcome.result.is_ok());
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let mut runner = runner();
        runner.run_command("echo broken >&2; exit 3");
        let outcome = runner.next_outcome().await.unwrap();
        match outcome.result {
            Err(ExternalCommandError::NonZeroExit { status, stderr, .. }) => {
                assert_eq!(status, "exit code 3");
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_executable_is_not_found() {
        let mut runner = runner();
        runner.run_command("definitely-not-a-real-program-mks --flag");
        let outcome = runner.next_outcome().await.unwrap();
        assert!(matches!(
            outcome.result,
            Err(ExternalCommandError::NotFound { ref program }) if program == "definitely-not-a-real-program-mks"
        ));
    }

    #[tokio::test]
    async fn missing_shell_is_not_found() {
        let mut runner = ProcessRunner::with_programs(
            Handle::current(),
            ShellProgram {
                program: "/nonexistent/shell".into(),
                args: vec!["-c".to_string()],
            },
            open_handler(),
        );
        runner.run_command("true");
        let outcome = runner.next_outcome().await.unwrap();
        assert!(matches!(outcome.result, Err(ExternalCommandError::NotFound { .. })));
    }

    #[tokio::test]
    async fn empty_command_fails_without_spawning() {
        let mut runner = runner();
        runner.run_command("   ");
        let failures = runner.drain_failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], ExternalCommandError::Empty));
    }

    #[tokio::test]
    async fn open_checks_path_and_handler_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = runner();
        runner.open_path(&dir.path().join("missing.txt"));
        assert!(matches!(
            runner.drain_failures().as_slice(),
            [ExternalCommandError::PathNotFound { .. }]
        ));

        let file = dir.path().join("present.txt");
        std::fs::write(&file, "x").unwrap();
        let mut no_handler = ProcessRunner::with_programs(
            Handle::current(),
            detect_shell(),
            ShellProgram {
                program: "no-such-opener-mks".into(),
                args: Vec::new(),
            },
        );
        no_handler.open_path(&file);
        assert!(matches!(
            no_handler.drain_failures().as_slice(),
            [ExternalCommandError::HandlerMissing { .. }]
        ));

        runner.open_path(&file);
        assert!(runner.next_outcome().await.unwrap().result.is_ok());
    }

    #[test]
    fn long_stderr_is_truncated() {
        let long = "e".repeat(MAX_STDERR_CHARS + 10);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), MAX_STDERR_CHARS + 1);
        assert!(cut.ends_with('…'));
    }
}
