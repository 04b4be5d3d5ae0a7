//! Scratch repositories for unit tests

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use assert_fs::TempDir;
use std::path::{Path, PathBuf};

pub(crate) struct Sandbox {
    pub dir: TempDir,
    pub workspace: Workspace,
    pub database: Database,
    pub index: Index,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let git = dir.path().join(".git");
        std::fs::create_dir_all(git.join("objects")).unwrap();

        Sandbox {
            workspace: Workspace::new(dir.path().into()),
            database: Database::new(git.join("objects").into_boxed_path()),
            index: Index::new(git.join("index").into_boxed_path()),
            dir,
        }
    }

    pub fn blob(&self, content: &str) -> ObjectId {
        self.database.store(&Blob::from(content.as_bytes())).unwrap()
    }

    /// Store a snapshot holding `files` and load it back
    pub fn tree(&self, files: &[(&str, &str)]) -> Tree {
        let entries = files
            .iter()
            .map(|(path, content)| {
                IndexEntry::new(
                    PathBuf::from(path),
                    self.blob(content),
                    EntryMetadata {
                        mode: EntryMode::REGULAR,
                        ..Default::default()
                    },
                )
            })
            .collect::<Vec<_>>();

        let oid = self
            .database
            .store_tree(&Tree::build(entries.iter()).unwrap())
            .unwrap();
        self.database.load_tree(&oid).unwrap()
    }

    pub fn write(&self, path: &str, content: &str) {
        let full_path = self.dir.path().join(path);
        std::fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        std::fs::write(full_path, content).unwrap();
    }

    pub fn read(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.dir.path().join(path)).ok()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.dir.path().join(path).exists()
    }

    /// Record the working copy of `path` in the index
    pub fn stage(&mut self, path: &str) {
        let path = Path::new(path);
        let content = self.workspace.read_file(path).unwrap();
        let oid = self.database.store(&Blob::new(content)).unwrap();
        let metadata = self.workspace.stat_file(path).unwrap();

        self.index
            .add(IndexEntry::new(path.to_path_buf(), oid, metadata))
            .unwrap();
    }

    /// Write each file to the working directory and stage it
    pub fn stage_all(&mut self, files: &[(&str, &str)]) {
        for (path, content) in files {
            self.write(path, content);
            self.stage(path);
        }
    }

    pub fn staged_oid(&self, path: &str) -> Option<ObjectId> {
        self.index.entry_by_path(Path::new(path)).map(|entry| entry.oid)
    }
}
