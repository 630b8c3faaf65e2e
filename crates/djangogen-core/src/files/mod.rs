//! Generated project files
//!
//! This module provides:
//! - [`FileSpec`]: a path under the project root plus how to materialize it
//! - The fixed Django layout and its ordering check ([`layout`])
//! - The writer that applies specs with overwrite semantics ([`writer`])

pub mod layout;
pub mod payloads;
pub mod writer;

use crate::config::{AppName, ProjectName};
use crate::error::FileWriteError;
use std::fmt;
use std::path::{Component, Path, PathBuf};

pub use writer::{write_all, write_text, WrittenEntry};

/// Names the generated content is rendered for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    project_name: ProjectName,
    app_name: AppName,
}

impl ProjectContext {
    pub fn new(project_name: ProjectName, app_name: AppName) -> Self {
        Self {
            project_name,
            app_name,
        }
    }

    pub fn project_name(&self) -> &ProjectName {
        &self.project_name
    }

    pub fn app_name(&self) -> &AppName {
        &self.app_name
    }
}

/// Produces a file's content; called fresh on every write
pub type ContentFn = fn(&ProjectContext) -> String;

/// What a spec materializes
#[derive(Clone, Copy)]
pub enum SpecKind {
    Directory,
    File(ContentFn),
}

impl fmt::Debug for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecKind::Directory => f.write_str("Directory"),
            SpecKind::File(_) => f.write_str("File"),
        }
    }
}

/// A directory or file to create under the project root
#[derive(Debug, Clone)]
pub struct FileSpec {
    path: PathBuf,
    kind: SpecKind,
}

impl FileSpec {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: SpecKind::Directory,
        }
    }

    pub fn file(path: impl Into<PathBuf>, content: ContentFn) -> Self {
        Self {
            path: path.into(),
            kind: SpecKind::File(content),
        }
    }

    /// Path relative to the project root
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> SpecKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, SpecKind::Directory)
    }

    /// Render the file content, `None` for directories
    pub fn render(&self, ctx: &ProjectContext) -> Option<String> {
        match self.kind {
            SpecKind::Directory => None,
            SpecKind::File(content) => Some(content(ctx)),
        }
    }
}

/// Ensure a path stays inside the root it is joined to
pub fn validate_relative(path: &Path) -> Result<(), FileWriteError> {
    let mut normal = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(FileWriteError::InvalidPath {
                    path: path.to_path_buf(),
                });
            }
        }
    }
    if normal == 0 {
        return Err(FileWriteError::InvalidPath {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
