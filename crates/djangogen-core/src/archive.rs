//! Zip packaging of the generated project tree
//!
//! The archive is built next to its final path as `<name>.partial` and renamed
//! into place only once it is complete, so a failed run never leaves a
//! truncated archive behind.

use crate::error::ArchiveError;
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A file to store and the name it gets inside the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub source: PathBuf,
    /// `/`-separated path relative to the packaged root
    pub name: String,
}

/// Result of a successful [`pack`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub entry_count: usize,
    pub byte_size: u64,
}

impl ArchiveSummary {
    pub fn size_kb(&self) -> f64 {
        self.byte_size as f64 / 1024.0
    }
}

/// Every regular file under `root`, sorted by path
pub fn collect_entries(root: &Path) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| ArchiveError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;

        // Skip directories and symlinks
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ArchiveError::Io {
                path: entry.path().to_path_buf(),
                source: io::Error::new(io::ErrorKind::Other, e),
            })?;

        let name = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ArchiveError::NonUtf8Path {
                path: entry.path().to_path_buf(),
            })?
            .join("/");

        entries.push(ArchiveEntry {
            source: entry.path().to_path_buf(),
            name,
        });
    }

    Ok(entries)
}

fn partial_path(archive_path: &Path) -> PathBuf {
    let mut name: OsString = archive_path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Reject archive paths that would be picked up by the walk itself
fn ensure_outside(root: &Path, archive_path: &Path) -> Result<(), ArchiveError> {
    let parent = match archive_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ArchiveError::Io { path, source }
    };

    std::fs::create_dir_all(&parent).map_err(io_err(&parent))?;
    let parent = parent.canonicalize().map_err(io_err(&parent))?;
    let root_abs = root.canonicalize().map_err(io_err(root))?;

    if parent.starts_with(&root_abs) {
        return Err(ArchiveError::InsideRoot {
            archive: archive_path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }
    Ok(())
}

fn write_zip(entries: &[ArchiveEntry], target: &Path) -> Result<(), ArchiveError> {
    let file = File::create(target).map_err(|source| ArchiveError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    let mut zip = ZipWriter::new(file);
    let base_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        let io_err = |source| ArchiveError::Io {
            path: entry.source.clone(),
            source,
        };
        let zip_err = |source| ArchiveError::Zip {
            path: entry.source.clone(),
            source,
        };

        let mut source = File::open(&entry.source).map_err(io_err)?;

        #[cfg(unix)]
        let options = {
            use std::os::unix::fs::PermissionsExt;
            let mode = source.metadata().map_err(io_err)?.permissions().mode();
            base_options.unix_permissions(mode & 0o777)
        };
        #[cfg(not(unix))]
        let options = base_options;

        zip.start_file(entry.name.as_str(), options)
            .map_err(zip_err)?;
        io::copy(&mut source, &mut zip).map_err(io_err)?;
        debug!(entry = %entry.name, "archived");
    }

    zip.finish().map_err(|source| ArchiveError::Zip {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Package every regular file under `root` into a deflate-compressed zip
#[instrument(skip_all, fields(root = %root.display(), archive = %archive_path.display()))]
pub fn pack(root: &Path, archive_path: &Path) -> Result<ArchiveSummary, ArchiveError> {
    ensure_outside(root, archive_path)?;
    let entries = collect_entries(root)?;

    let partial = partial_path(archive_path);
    let finalize = write_zip(&entries, &partial).and_then(|()| {
        std::fs::rename(&partial, archive_path).map_err(|source| ArchiveError::Io {
            path: archive_path.to_path_buf(),
            source,
        })
    });

    if let Err(e) = finalize {
        // Never leave a half-written archive behind
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }

    let byte_size = std::fs::metadata(archive_path)
        .map_err(|source| ArchiveError::Io {
            path: archive_path.to_path_buf(),
            source,
        })?
        .len();

    let summary = ArchiveSummary {
        entry_count: entries.len(),
        byte_size,
    };
    info!(
        entries = summary.entry_count,
        bytes = summary.byte_size,
        "archive written"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::io::Read;
    use zip::ZipArchive;

    fn build_tree(root: &Path) {
        for (path, content) in [
            ("manage.py", "#!/usr/bin/env python\n"),
            ("MySite/settings.py", "DEBUG = True\n"),
            ("MySite/__init__.py", ""),
            ("main/templates/main/home.html", "<html></html>\n"),
            ("main/migrations/0001_initial.py", "# migration\n"),
        ] {
            let full = root.join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        std::fs::create_dir_all(root.join("static/empty")).unwrap();
    }

    fn archive_names(path: &Path) -> BTreeSet<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_archive_contains_exactly_the_tree_files() {
        let work = tempfile::tempdir().unwrap();
        let root = work.path().join("project");
        build_tree(&root);
        let out = work.path().join("out/MySite.zip");

        let summary = pack(&root, &out).unwrap();

        let expected: BTreeSet<String> = [
            "MySite/__init__.py",
            "MySite/settings.py",
            "main/migrations/0001_initial.py",
            "main/templates/main/home.html",
            "manage.py",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        assert_eq!(archive_names(&out), expected);
        assert_eq!(summary.entry_count, expected.len());
        assert_eq!(summary.byte_size, std::fs::metadata(&out).unwrap().len());
        assert!(!partial_path(&out).exists());
    }

    #[test]
    fn test_entry_content_and_compression() {
        let work = tempfile::tempdir().unwrap();
        let root = work.path().join("project");
        build_tree(&root);
        let out = work.path().join("MySite.zip");
        pack(&root, &out).unwrap();

        let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut file = archive.by_name("MySite/settings.py").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "DEBUG = True\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_bit_is_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let work = tempfile::tempdir().unwrap();
        let root = work.path().join("project");
        build_tree(&root);
        std::fs::set_permissions(
            root.join("manage.py"),
            std::fs::Permissions::from_mode(0o755),
        )
        .unwrap();
        let out = work.path().join("MySite.zip");
        pack(&root, &out).unwrap();

        let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let file = archive.by_name("manage.py").unwrap();
        assert_eq!(file.unix_mode().map(|m| m & 0o777), Some(0o755));
    }

    #[test]
    fn test_archive_inside_root_is_rejected() {
        let work = tempfile::tempdir().unwrap();
        let root = work.path().join("project");
        build_tree(&root);
        let out = root.join("MySite.zip");

        let err = pack(&root, &out).unwrap_err();
        assert!(matches!(err, ArchiveError::InsideRoot { .. }));
        assert!(!out.exists());
        assert!(!partial_path(&out).exists());
    }

    #[test]
    fn test_unwritable_destination_leaves_nothing_behind() {
        let work = tempfile::tempdir().unwrap();
        let root = work.path().join("project");
        build_tree(&root);
        // The output "directory" is a regular file
        let blocker = work.path().join("out");
        std::fs::write(&blocker, "x").unwrap();
        let out = blocker.join("MySite.zip");

        let err = pack(&root, &out).unwrap_err();
        assert!(matches!(err, ArchiveError::Io { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let work = tempfile::tempdir().unwrap();
        let out = work.path().join("MySite.zip");
        assert!(pack(&work.path().join("missing"), &out).is_err());
        assert!(!out.exists());
        assert!(!partial_path(&out).exists());
    }

    #[test]
    fn test_collect_entries_uses_forward_slashes() {
        let work = tempfile::tempdir().unwrap();
        build_tree(work.path());
        let entries = collect_entries(work.path()).unwrap();
        assert!(entries
            .iter()
            .any(|e| e.name == "main/templates/main/home.html"));
        assert!(entries.iter().all(|e| !e.name.contains('\\')));
    }
}
