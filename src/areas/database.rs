//! Object database
//!
//! Loose objects live under `.git/objects/ab/cdef…`, zlib-compressed. An
//! object is written once: storing content that is already present is a
//! no-op. Writes go to a temporary file first and are renamed into place.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, path_segments};
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            self.write_object(object_path, object.serialize()?)?;
        }

        Ok(object_id)
    }

    /// Store a tree built from the index along with every pending subtree
    pub fn store_tree(&self, tree: &Tree) -> anyhow::Result<ObjectId> {
        tree.traverse(&mut |subtree: &Tree| self.store(subtree).map(|_| ()))?;
        tree.object_id()
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (object_type, reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Blob::deserialize(reader),
            other => anyhow::bail!("Object {object_id} is a {other}, not a blob"),
        }
    }

    pub fn load_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let (object_type, reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Tree => Tree::deserialize(reader),
            other => anyhow::bail!("Object {object_id} is a {other}, not a tree"),
        }
    }

    /// Resolve a repository-relative path inside `tree`
    ///
    /// Intermediate subtrees are loaded as needed. `None` when some segment is
    /// missing or a blob stands where a subtree would be needed.
    pub fn lookup_entry(&self, tree: &Tree, path: &Path) -> anyhow::Result<Option<DatabaseEntry>> {
        let segments = path_segments(path)?;
        let Some((last, parents)) = segments.split_last() else {
            return Ok(None);
        };

        let mut current: Option<Tree> = None;
        for segment in parents {
            let parent = current.as_ref().unwrap_or(tree);
            match parent.entry(segment) {
                Some(entry) if entry.is_tree() => {
                    let oid = entry.oid;
                    current = Some(self.load_tree(&oid)?);
                }
                _ => return Ok(None),
            }
        }

        Ok(current.as_ref().unwrap_or(tree).entry(last).copied())
    }

    pub fn lookup_blob(&self, tree: &Tree, path: &Path) -> anyhow::Result<Option<DatabaseEntry>> {
        Ok(self.lookup_entry(tree, path)?.filter(DatabaseEntry::is_blob))
    }

    pub fn lookup_subtree(&self, tree: &Tree, path: &Path) -> anyhow::Result<Option<Tree>> {
        match self.lookup_entry(tree, path)? {
            Some(entry) if entry.is_tree() => Ok(Some(self.load_tree(&entry.oid)?)),
            _ => Ok(None),
        }
    }

    /// Find every stored object whose ID starts with `prefix`
    ///
    /// Used to resolve abbreviated IDs given on the command line. Only the
    /// fan-out directory named by the first two characters is searched, so
    /// the prefix must be at least two characters long.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        if prefix.len() < 2 || !prefix.is_ascii() {
            anyhow::bail!("Object prefix {prefix} is too short");
        }

        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);
        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path)? {
            let file_name = entry?.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix) {
                if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                    matches.push(oid);
                }
            }
        }
        matches.sort();

        Ok(matches)
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_path = self.path.join(object_id.to_path());
        let mut reader = Cursor::new(self.read_object(object_path)?);
        let object_type = ObjectType::parse_object_type(&mut reader)
            .with_context(|| format!("Corrupt object {object_id}"))?;

        Ok((object_type, reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path)
            .with_context(|| format!("Unable to read object file {}", object_path.display()))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .with_context(|| format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).with_context(|| {
            format!("Unable to create object directory {}", object_dir.display())
        })?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .with_context(|| {
                format!("Unable to open object file {}", temp_object_path.display())
            })?;
        file.write_all(&object_content).with_context(|| {
            format!("Unable to write object file {}", temp_object_path.display())
        })?;

        std::fs::rename(&temp_object_path, &object_path).with_context(|| {
            format!("Unable to rename object file to {}", object_path.display())
        })?;
        tracing::trace!(path = %object_path.display(), "stored object");

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(Bytes::from)
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::EntryMode;
    use crate::artifacts::index::index_entry::{EntryMetadata, IndexEntry};
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct Store {
        _dir: TempDir,
        database: Database,
    }

    #[fixture]
    fn store() -> Store {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        Store {
            _dir: dir,
            database,
        }
    }

    fn stage(database: &Database, path: &str, content: &str) -> IndexEntry {
        let oid = database.store(&Blob::from(content.as_bytes())).unwrap();
        IndexEntry::new(
            PathBuf::from(path),
            oid,
            EntryMetadata {
                mode: EntryMode::REGULAR,
                ..Default::default()
            },
        )
    }

    #[rstest]
    fn stored_blob_loads_back(store: Store) {
        let blob = Blob::from(b"hello\n".as_slice());

        let oid = store.database.store(&blob).unwrap();

        assert!(store.database.contains(&oid));
        assert_eq!(store.database.load_blob(&oid).unwrap(), blob);
        assert!(store.database.load_tree(&oid).is_err());
    }

    #[rstest]
    fn lookups_descend_through_subtrees(store: Store) {
        let db = &store.database;
        let entries = [
            stage(db, "a.txt", "a"),
            stage(db, "lib/mod.rs", "mod"),
            stage(db, "lib/nested/deep.rs", "deep"),
        ];
        let root_id = db.store_tree(&Tree::build(entries.iter()).unwrap()).unwrap();
        let root = db.load_tree(&root_id).unwrap();

        let deep = db.lookup_blob(&root, Path::new("lib/nested/deep.rs")).unwrap();
        assert_eq!(deep.map(|e| e.oid), Some(entries[2].oid));

        assert!(db.lookup_blob(&root, Path::new("lib")).unwrap().is_none());
        assert!(db.lookup_blob(&root, Path::new("a.txt/below")).unwrap().is_none());
        assert!(db.lookup_entry(&root, Path::new("missing")).unwrap().is_none());

        let nested = db.lookup_subtree(&root, Path::new("lib/nested")).unwrap().unwrap();
        assert!(nested.entry("deep.rs").is_some());
    }

    #[rstest]
    fn prefix_search_finds_stored_objects(store: Store) {
        let oid = store.database.store(&Blob::from(b"hello\n".as_slice())).unwrap();

        let found = store
            .database
            .find_objects_by_prefix(&oid.to_short_oid())
            .unwrap();

        assert_eq!(found, vec![oid]);
        assert!(store.database.find_objects_by_prefix("0").is_err());
    }
}
