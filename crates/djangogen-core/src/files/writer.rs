//! Apply file specs to a project tree

use super::{validate_relative, FileSpec, ProjectContext};
use crate::error::FileWriteError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// One directory or file materialized by [`write_all`], relative to the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrittenEntry {
    Directory(PathBuf),
    File { path: PathBuf, bytes: usize },
}

impl WrittenEntry {
    pub fn path(&self) -> &Path {
        match self {
            WrittenEntry::Directory(path) | WrittenEntry::File { path, .. } => path,
        }
    }
}

/// Write every spec under `root`, in order, replacing existing files
pub async fn write_all(
    root: &Path,
    specs: &[FileSpec],
    ctx: &ProjectContext,
) -> Result<Vec<WrittenEntry>, FileWriteError> {
    let mut written = Vec::with_capacity(specs.len());

    for spec in specs {
        match spec.render(ctx) {
            None => {
                validate_relative(spec.path())?;
                let target = root.join(spec.path());
                fs::create_dir_all(&target)
                    .await
                    .map_err(|source| FileWriteError::Io {
                        path: target.clone(),
                        source,
                    })?;
                debug!(path = %spec.path().display(), "created directory");
                written.push(WrittenEntry::Directory(spec.path().to_path_buf()));
            }
            Some(content) => {
                let bytes = write_text(root, spec.path(), &content).await?;
                written.push(WrittenEntry::File {
                    path: spec.path().to_path_buf(),
                    bytes,
                });
            }
        }
    }

    Ok(written)
}

/// Write UTF-8 text to `root/relative`, creating parent directories.
/// Any existing file is truncated, never appended to.
pub async fn write_text(
    root: &Path,
    relative: &Path,
    content: &str,
) -> Result<usize, FileWriteError> {
    validate_relative(relative)?;
    let target = root.join(relative);

    // Ensure parent directories exist
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| FileWriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    fs::write(&target, content.as_bytes())
        .await
        .map_err(|source| FileWriteError::Io {
            path: target.clone(),
            source,
        })?;

    debug!(path = %relative.display(), bytes = content.len(), "wrote file");
    Ok(content.len())
}
