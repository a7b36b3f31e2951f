//! A `CommandRunner` that records each call and answers from a script.

use super::shared_buf::SharedBuf;
use ifgrun_core::shell::{CommandOutcome, CommandRunner};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outcomes: VecDeque<CommandOutcome>,
    pub calls: Vec<(String, PathBuf)>,
    watched: Option<SharedBuf>,
    /// Contents of the watched output at the moment of each call.
    pub output_at_call: Vec<String>,
}

impl ScriptedRunner {
    /// Outcomes are handed out in order; once exhausted every call exits 0.
    pub fn new(outcomes: Vec<CommandOutcome>) -> Self {
        Self {
            outcomes: outcomes.into(),
            calls: Vec::new(),
            watched: None,
            output_at_call: Vec::new(),
        }
    }

    /// Snapshot `buf` every time a command is run.
    pub fn watching(mut self, buf: SharedBuf) -> Self {
        self.watched = Some(buf);
        self
    }

    pub fn commands(&self) -> Vec<&str> {
        self.calls.iter().map(|(c, _)| c.as_str()).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, command: &str, cwd: &Path) -> CommandOutcome {
        self.calls.push((command.to_string(), cwd.to_path_buf()));
        if let Some(buf) = &self.watched {
            self.output_at_call.push(buf.text());
        }
        self.outcomes
            .pop_front()
            .unwrap_or(CommandOutcome::Exited(0))
    }
}
