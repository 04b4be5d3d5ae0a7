use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use std::path::{Path, PathBuf};

impl Repository {
    pub fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let mut index = self.index();
        index.rehydrate()?;

        let mut files = Vec::new();
        for path in paths {
            let relative = self.relative_path(Path::new(path))?;
            files.extend(self.workspace().list_files(&relative)?);
        }

        for file in files {
            let data = self.workspace().read_file(&file)?;
            let stat = self.workspace().stat_file(&file)?;

            let blob_id = self.database().store(&Blob::new(data))?;
            tracing::trace!(path = %file.display(), oid = %blob_id, "staged");
            index.add(IndexEntry::new(file, blob_id, stat))?;
        }

        index.write_updates()
    }

    /// Express a command-line path relative to the working root
    fn relative_path(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let absolute = path
            .canonicalize()
            .with_context(|| format!("pathspec '{}' did not match any files", path.display()))?;

        absolute
            .strip_prefix(self.path())
            .map(Path::to_path_buf)
            .map_err(|_| anyhow::anyhow!("{} is outside the repository", path.display()))
    }
}
