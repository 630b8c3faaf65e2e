//! Error types for every pipeline stage
//!
//! Each stage has its own error kind so the orchestrator can report which stage
//! failed and why. [`PipelineError`] wraps them for propagation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration could not be turned into a valid [`crate::PipelineConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: &'static str },

    #[error("invalid app name '{name}': {reason}")]
    InvalidAppName { name: String, reason: &'static str },

    #[error("{field} command line is empty")]
    EmptyCommand { field: &'static str },

    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("file layout is misordered: {0}")]
    Layout(String),
}

/// The temporary workspace could not be created or removed
#[derive(Debug, Error)]
#[error("workspace error at {path}")]
pub struct WorkspaceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// An external tool failed to launch or exited unsuccessfully
#[derive(Debug, Error)]
pub enum ExternalToolError {
    #[error("failed to launch `{command}`")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {}{}", describe_exit(.exit_code), describe_stderr(.stderr))]
    Exit {
        command: String,
        /// `None` when the process was terminated by a signal
        exit_code: Option<i32>,
        stderr: String,
    },
}

impl ExternalToolError {
    /// The command line that failed
    pub fn command(&self) -> &str {
        match self {
            Self::Launch { command, .. } | Self::Exit { command, .. } => command,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty());
    match last {
        Some(line) => format!(": {}", line.trim()),
        None => String::new(),
    }
}

/// A generated file or directory could not be written
#[derive(Debug, Error)]
pub enum FileWriteError {
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path {path} escapes the project root")]
    InvalidPath { path: PathBuf },
}

/// The seed script could not be assembled
#[derive(Debug, Error)]
#[error("failed to serialize seed records")]
pub struct SeedError(#[from] pub serde_json::Error);

/// The project tree could not be packaged
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to archive {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to write zip entry for {path}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("path {path} is not valid UTF-8 and cannot be stored in the archive")]
    NonUtf8Path { path: PathBuf },

    #[error("archive {archive} would be written inside the tree it packages ({root})")]
    InsideRoot { archive: PathBuf, root: PathBuf },
}

/// Any failure that aborts a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    ExternalTool(#[from] ExternalToolError),

    #[error(transparent)]
    FileWrite(#[from] FileWriteError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
