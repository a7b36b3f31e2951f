//! Shell command execution that records, but never propagates, failure.
//!
//! Every stage of a job is a shell command line. A failed stage must not stop
//! the job, so runners return a [`CommandOutcome`] instead of an error and the
//! caller decides what to do with it (the job sequence only logs it).

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// How a command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The process exited with this status code.
    Exited(i32),
    /// The process was killed by this signal number.
    Signaled(i32),
    /// The shell could not be started at all.
    SpawnFailed(String),
}

impl CommandOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return CommandOutcome::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return CommandOutcome::Signaled(sig);
            }
        }
        CommandOutcome::SpawnFailed(format!("unrecognised exit status: {}", status))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Exited(0))
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Exited(code) => write!(f, "Child returned {}", code),
            CommandOutcome::Signaled(sig) => write!(f, "Child was terminated by signal {}", sig),
            CommandOutcome::SpawnFailed(e) => write!(f, "Execution failed: {}", e),
        }
    }
}

/// Runs one command line in a directory.
pub trait CommandRunner {
    fn run(&mut self, command: &str, cwd: &Path) -> CommandOutcome;
}

/// Runs commands through `<shell> -c`, inheriting stdio, and reports the
/// outcome on stderr.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
}

impl ShellRunner {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("/bin/sh")
    }
}

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str, cwd: &Path) -> CommandOutcome {
        tracing::info!(command, cwd = %cwd.display(), "running");
        let outcome = match Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .status()
        {
            Ok(status) => CommandOutcome::from_status(status),
            Err(e) => CommandOutcome::SpawnFailed(e.to_string()),
        };
        eprintln!("{}", outcome);
        if outcome.is_success() {
            tracing::debug!(command, "{}", outcome);
        } else {
            tracing::warn!(command, "{}", outcome);
        }
        outcome
    }
}
