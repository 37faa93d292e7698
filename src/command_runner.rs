//! Shell command execution.
//!
//! All external commands go through a `CommandRunner`. Production code uses
//! `ShellRunner`, which hands the command line to the platform shell; tests use
//! `RecordingRunner`, which returns canned output and remembers every command
//! it was asked to run.
//!
//! # Exit Status Policy
//!
//! `capture` returns whatever the command printed even when it exits non-zero
//! (the status is logged at warn level). `run` is fire-and-forget: it waits
//! for the command to finish but never turns its exit status into an error.
//! Only a failure to launch the process is reported.

use std::cell::RefCell;
use std::process::{Command, Stdio};

use crate::error::{Result, UninstallError};

/// Capability to execute shell command lines.
pub trait CommandRunner {
    /// Run `command_line` and return its standard output as text.
    fn capture(&self, command_line: &str) -> Result<String>;

    /// Run `command_line` to completion without inspecting the outcome.
    fn run(&self, command_line: &str) -> Result<()>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn capture(&self, command_line: &str) -> Result<String> {
        (**self).capture(command_line)
    }

    fn run(&self, command_line: &str) -> Result<()> {
        (**self).run(command_line)
    }
}

/// Runner backed by the system shell (`cmd /C` on Windows, `sh -c` elsewhere).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    use std::os::windows::process::CommandExt;

    // raw_arg keeps embedded quotes exactly as written; cmd does its own parsing.
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").raw_arg(command_line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

impl CommandRunner for ShellRunner {
    fn capture(&self, command_line: &str) -> Result<String> {
        tracing::debug!("capture: {}", command_line);

        let output = shell_command(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                UninstallError::command(format!("Failed to run '{}': {}", command_line, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                "'{}' exited with code {:?}: {}",
                command_line,
                output.status.code(),
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn run(&self, command_line: &str) -> Result<()> {
        tracing::debug!("run: {}", command_line);

        let status = shell_command(command_line).status().map_err(|e| {
            UninstallError::command(format!("Failed to run '{}': {}", command_line, e))
        })?;

        tracing::debug!("'{}' finished with code {:?}", command_line, status.code());
        Ok(())
    }
}

/// A command observed by `RecordingRunner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCommand {
    Captured(String),
    Run(String),
}

impl RecordedCommand {
    pub fn command_line(&self) -> &str {
        match self {
            Self::Captured(line) | Self::Run(line) => line,
        }
    }
}

/// Test runner: serves fixed capture output and records every call.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    output: String,
    fail_launch: bool,
    commands: RefCell<Vec<RecordedCommand>>,
}

impl RecordingRunner {
    /// Runner whose `capture` always returns `output`.
    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Default::default()
        }
    }

    /// Runner that records calls but reports every launch as failed.
    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Default::default()
        }
    }

    /// All commands seen so far, in call order.
    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.borrow().clone()
    }

    /// Command lines passed to `run`, in call order.
    pub fn run_commands(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::Run(line) => Some(line.clone()),
                RecordedCommand::Captured(_) => None,
            })
            .collect()
    }

    fn record(&self, command: RecordedCommand) -> Result<()> {
        let line = command.command_line().to_string();
        self.commands.borrow_mut().push(command);
        if self.fail_launch {
            return Err(UninstallError::command(format!(
                "Failed to run '{}': launch refused",
                line
            )));
        }
        Ok(())
    }
}

impl CommandRunner for RecordingRunner {
    fn capture(&self, command_line: &str) -> Result<String> {
        self.record(RecordedCommand::Captured(command_line.to_string()))?;
        Ok(self.output.clone())
    }

    fn run(&self, command_line: &str) -> Result<()> {
        self.record(RecordedCommand::Run(command_line.to_string()))
    }
}
