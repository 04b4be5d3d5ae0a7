//! Staging record (the index)
//!
//! The index records what is currently tracked: for every file, the content
//! ID last staged or checked out and the `stat` fingerprint of the working
//! copy at that moment. Checkout reads it as a third tree next to the prior
//! and target snapshots, and rewrites entries as files are materialized.
//!
//! ## Data Structures
//!
//! - `entries`: Maps file paths to their index entries, ordered component-wise
//!   so the contents of a directory are contiguous
//! - `children`: Maps directory paths to every entry beneath them, so a file
//!   replacing a directory (or the reverse) can drop the displaced entries

use crate::areas::database::Database;
use crate::artifacts::index::checksum::{ChecksumReader, ChecksumWriter};
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufReader, BufWriter, Cursor};
use std::ops::DerefMut;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    entries: BTreeMap<Box<Path>, IndexEntry>,
    children: BTreeMap<Box<Path>, BTreeSet<Box<Path>>>,
    /// Set when entries differ from what was last loaded or written
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// Whether some entry lives strictly beneath `path`
    #[cfg(test)]
    fn has_children(&self, path: &Path) -> bool {
        self.children.contains_key(path)
    }

    /// Whether entries differ from what was last loaded or written
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.changed = false;
    }

    /// Load the index from disk
    ///
    /// A missing or empty file yields an empty index. The trailing checksum
    /// is verified. A shared lock is held on the file while reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open index {}", self.path.display()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = ChecksumReader::new(BufReader::new(lock.deref_mut()));
        let header = IndexHeader::deserialize(Cursor::new(reader.read(HEADER_SIZE)?))?;
        header.validate()?;

        for _ in 0..header.entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();
            while entry_bytes.last() != Some(&0) {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::deserialize(Cursor::new(entry_bytes))?;
            self.store_entry(entry);
        }

        reader.verify()
    }

    /// Flush entries to disk under an exclusive lock
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open index {}", self.path.display()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = ChecksumWriter::new(BufWriter::new(lock.deref_mut()));
        let header = IndexHeader {
            entries_count: self.entries.len() as u32,
            ..IndexHeader::empty()
        };
        std::io::Write::write_all(&mut writer, &header.serialize()?)?;

        for entry in self.entries.values() {
            std::io::Write::write_all(&mut writer, &entry.serialize()?)?;
        }

        writer.finish()?;
        self.changed = false;

        Ok(())
    }

    /// Stage an entry, dropping whatever it displaces
    ///
    /// A file entry at `a/b` displaces a file entry `a`; a file entry `a`
    /// displaces every entry beneath `a/`.
    pub fn add(&mut self, entry: IndexEntry) -> anyhow::Result<()> {
        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;

        Ok(())
    }

    /// Untrack the file at `path`
    pub fn remove(&mut self, path: &Path) -> anyhow::Result<()> {
        self.remove_entry(path);
        self.changed = true;

        Ok(())
    }

    /// Entries in path order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Write the tracked entries as trees and return the root tree ID
    pub fn write_tree(&self, database: &Database) -> anyhow::Result<ObjectId> {
        let tree = Tree::build(self.entries())?;
        database.store_tree(&tree)
    }

    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_entry(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.into())
                .or_default()
                .insert(entry.name.clone().into_boxed_path());
        }

        self.entries
            .insert(entry.name.clone().into_boxed_path(), entry);
    }

    fn remove_children(&mut self, path: &Path) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_entry(&child);
            }
        }
    }

    fn remove_entry(&mut self, path: &Path) {
        let Some(entry) = self.entries.remove(path) else {
            return;
        };

        for parent in entry.parent_dirs() {
            if let Some(children) = self.children.get_mut(parent) {
                children.remove(path);
                if children.is_empty() {
                    self.children.remove(parent);
                }
            }
        }
    }
}
