//! Scoped temporary workspace for a single pipeline run
//!
//! Every run gets its own uniquely named directory. The handle removes the
//! directory on [`Workspace::release`], or on drop if a run unwinds. Live
//! workspaces are also tracked process-wide so an interrupt handler can remove
//! them before the process exits.

use crate::error::WorkspaceError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tracing::debug;

static ACTIVE: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

fn register(path: &Path) {
    let mut active = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    active.push(path.to_path_buf());
}

fn unregister(path: &Path) {
    let mut active = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
    active.retain(|p| p != path);
}

/// Remove every workspace that is still live in this process.
///
/// Meant for signal handlers, which exit without running destructors.
/// Returns the number of directories removed.
pub fn remove_active() -> usize {
    let paths: Vec<PathBuf> = {
        let mut active = ACTIVE.lock().unwrap_or_else(|e| e.into_inner());
        active.drain(..).collect()
    };
    paths
        .iter()
        .filter(|p| std::fs::remove_dir_all(p).is_ok())
        .count()
}

/// Temporary root directory exclusively owned by one run
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory under `base`, creating `base` if needed
    pub fn acquire(base: &Path, prefix: &str) -> Result<Self, WorkspaceError> {
        std::fs::create_dir_all(base).map_err(|source| WorkspaceError {
            path: base.to_path_buf(),
            source,
        })?;

        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(base)
            .map_err(|source| WorkspaceError {
                path: base.to_path_buf(),
                source,
            })?;

        let path = dir.path().to_path_buf();
        register(&path);
        debug!(path = %path.display(), "workspace acquired");

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recursively delete the workspace. Consumes the handle, so it runs once.
    pub fn release(mut self) -> Result<(), WorkspaceError> {
        unregister(&self.path);
        match self.dir.take() {
            Some(dir) => dir.close().map_err(|source| WorkspaceError {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.dir.is_some() {
            unregister(&self.path);
            debug!(path = %self.path.display(), "workspace dropped without release");
        }
    }
}
