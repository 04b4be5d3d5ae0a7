//! Working directory file I/O
//!
//! All paths taken and returned here are relative to the working root. The
//! repository metadata directory is never listed as part of the working tree.

use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::index::index_entry::EntryMetadata;
use anyhow::Context;
use bytes::Bytes;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 1] = [".git"];

/// What currently occupies a working-directory path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Absent,
    File,
    Directory,
}

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn full_path(&self, file_path: &Path) -> PathBuf {
        self.path.join(file_path)
    }

    /// Classify a path without following a trailing symlink
    pub fn kind(&self, file_path: &Path) -> anyhow::Result<PathKind> {
        match std::fs::symlink_metadata(self.full_path(file_path)) {
            Ok(metadata) if metadata.is_dir() => Ok(PathKind::Directory),
            Ok(_) => Ok(PathKind::File),
            Err(err) if Self::is_missing(&err) => Ok(PathKind::Absent),
            Err(err) => Err(err)
                .with_context(|| format!("Unable to stat {}", file_path.display())),
        }
    }

    pub fn stat_file(&self, file_path: &Path) -> anyhow::Result<EntryMetadata> {
        let full_path = self.full_path(file_path);
        let metadata = std::fs::metadata(&full_path)
            .with_context(|| format!("Unable to stat {}", file_path.display()))?;

        Ok(EntryMetadata::from_metadata(&full_path, &metadata))
    }

    /// Like [`Workspace::stat_file`], with `None` when nothing is at the path
    pub fn try_stat_file(&self, file_path: &Path) -> anyhow::Result<Option<EntryMetadata>> {
        let full_path = self.full_path(file_path);

        match std::fs::metadata(&full_path) {
            Ok(metadata) => Ok(Some(EntryMetadata::from_metadata(&full_path, &metadata))),
            Err(err) if Self::is_missing(&err) => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("Unable to stat {}", file_path.display())),
        }
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let content = std::fs::read(self.full_path(file_path))
            .with_context(|| format!("Unable to read {}", file_path.display()))?;

        Ok(content.into())
    }

    /// Write `content` at `file_path`, replacing whatever occupies it
    ///
    /// Missing parent directories are created. Returns the fresh `stat` of the
    /// written file, ready to be recorded in the index.
    pub fn write_file(
        &self,
        file_path: &Path,
        content: &[u8],
        mode: FileMode,
    ) -> anyhow::Result<EntryMetadata> {
        let full_path = self.full_path(file_path);

        if self.kind(file_path)? == PathKind::Directory {
            tracing::warn!(path = %file_path.display(), "replacing directory with file");
            std::fs::remove_dir_all(&full_path)
                .with_context(|| format!("Unable to remove directory {}", file_path.display()))?;
        }

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create parent directories of {}", file_path.display())
            })?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .with_context(|| format!("Unable to open {}", file_path.display()))?;
        file.write_all(content)
            .with_context(|| format!("Unable to write {}", file_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(EntryMode::from(mode).permissions());
            std::fs::set_permissions(&full_path, permissions).with_context(|| {
                format!("Unable to set permissions of {}", file_path.display())
            })?;
        }

        self.stat_file(file_path)
    }

    /// Delete the file at `file_path`
    ///
    /// Returns `false` when nothing was there. A directory is only removed
    /// when it is empty; anything inside it stays and the call fails.
    pub fn remove_file(&self, file_path: &Path) -> std::io::Result<bool> {
        let full_path = self.full_path(file_path);

        let result = match std::fs::symlink_metadata(&full_path) {
            Ok(metadata) if metadata.is_dir() => std::fs::remove_dir(&full_path),
            Ok(_) => std::fs::remove_file(&full_path),
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => Ok(true),
            Err(err) if Self::is_missing(&err) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Delete the now-empty directories above `file_path`
    ///
    /// Stops at the first ancestor that still has content, and never removes
    /// the working root itself.
    pub fn remove_empty_parents(&self, file_path: &Path) -> anyhow::Result<()> {
        for parent in file_path.ancestors().skip(1) {
            if parent.as_os_str().is_empty() {
                break;
            }

            let full_path = self.full_path(parent);
            let is_empty = match std::fs::read_dir(&full_path) {
                Ok(mut entries) => entries.next().is_none(),
                Err(err) if Self::is_missing(&err) => continue,
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Unable to list {}", parent.display()));
                }
            };
            if !is_empty {
                break;
            }

            std::fs::remove_dir(&full_path)
                .with_context(|| format!("Unable to remove directory {}", parent.display()))?;
            tracing::trace!(path = %parent.display(), "removed empty directory");
        }

        Ok(())
    }

    /// Every file beneath `dir`, sorted, relative to the working root
    pub fn list_files(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let root = self.full_path(dir);
        let mut files = Vec::new();

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.file_name()));

        for entry in walker {
            let entry = entry.with_context(|| format!("Unable to list {}", dir.display()))?;
            if entry.file_type().is_dir() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(self.path.as_ref())
                .with_context(|| format!("{} is outside the workspace", entry.path().display()))?;
            files.push(relative.to_path_buf());
        }

        Ok(files)
    }

    fn is_ignored(name: &std::ffi::OsStr) -> bool {
        IGNORED_PATHS.iter().any(|ignored| name == *ignored)
    }

    /// A path is missing when it, or one of its parents, does not exist as a
    /// directory
    fn is_missing(err: &std::io::Error) -> bool {
        matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
    }
}
