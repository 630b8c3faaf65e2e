//! External tool invocation
//!
//! Every command carries its own working directory; the process-wide current
//! directory is never changed.

use crate::config::ToolCommand;
use crate::error::ExternalToolError;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

/// Descriptor for one external command. Success means exit code zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ExternalCommand {
    /// Build a command from a tool's command line plus extra arguments
    pub fn new<I, S>(tool: &ToolCommand, args: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all_args = tool.args.clone();
        all_args.extend(args.into_iter().map(Into::into));
        Self {
            program: tool.program.clone(),
            args: all_args,
            cwd: cwd.into(),
        }
    }

    /// Human-readable command line, used in logs and errors
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output of a command that exited successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external commands to completion
pub trait CommandRunner {
    fn run(
        &self,
        command: &ExternalCommand,
    ) -> impl Future<Output = Result<CommandResult, ExternalToolError>> + Send;
}

/// Spawns real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ExternalCommand) -> Result<CommandResult, ExternalToolError> {
        let line = command.command_line();
        info!(command = %line, cwd = %command.cwd.display(), "running");

        let output = TokioCommand::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ExternalToolError::Launch {
                command: line.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(command = %line, stdout = %stdout.trim(), stderr = %stderr.trim(), "finished");

        match output.status.code() {
            Some(0) => Ok(CommandResult {
                exit_code: 0,
                stdout,
                stderr,
            }),
            exit_code => Err(ExternalToolError::Exit {
                command: line,
                exit_code,
                stderr,
            }),
        }
    }
}
