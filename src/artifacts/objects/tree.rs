//! Tree object
//!
//! Trees are immutable directory snapshots. Each entry maps a single path
//! segment to a blob (file) or to another tree (subdirectory).
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! Entries are serialized in git order, where a subtree sorts as if its
//! name ended in `/`, so that tree IDs agree with git. In memory, entries are
//! kept in plain name order, which is the order the tree walker visits them.
//!
//! ## Tree Building
//!
//! [`Tree::build`] assembles the nested trees described by a set of index
//! entries. Subtrees created this way are held as pending children until
//! [`Tree::traverse`] hands them to the database, children first.

use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Component, Path};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    /// Members by name, blobs and subtrees alike
    entries: BTreeMap<String, DatabaseEntry>,
    /// Subtrees assembled by `build` that still have to be stored
    pending: BTreeMap<String, Tree>,
}

impl Tree {
    /// Build a tree hierarchy from index entries
    ///
    /// Entries must describe a consistent file hierarchy: no path may be both
    /// a file and a parent of another path. The index guarantees this.
    pub fn build<'e>(entries: impl Iterator<Item = &'e IndexEntry>) -> anyhow::Result<Self> {
        let mut files: BTreeMap<String, Vec<(Vec<String>, &'e IndexEntry)>> = BTreeMap::new();

        for entry in entries {
            let mut segments = path_segments(&entry.name)?;
            if segments.is_empty() {
                anyhow::bail!("Index entry with an empty path");
            }
            let name = segments.remove(0);
            files.entry(name).or_default().push((segments, entry));
        }

        Self::build_level(files)
    }

    fn build_level(
        files: BTreeMap<String, Vec<(Vec<String>, &IndexEntry)>>,
    ) -> anyhow::Result<Self> {
        let mut tree = Self::default();

        for (name, members) in files {
            let is_file = matches!(members.as_slice(), [(rest, _)] if rest.is_empty());

            if is_file {
                let entry = members[0].1;
                tree.entries
                    .insert(name, DatabaseEntry::new(entry.oid, entry.metadata.mode));
                continue;
            }

            let mut nested: BTreeMap<String, Vec<(Vec<String>, &IndexEntry)>> = BTreeMap::new();
            for (mut rest, entry) in members {
                if rest.is_empty() {
                    anyhow::bail!("{} is both a file and a directory", entry.name.display());
                }
                let child = rest.remove(0);
                nested.entry(child).or_default().push((rest, entry));
            }

            let subtree = Self::build_level(nested)?;
            tree.entries.insert(
                name.clone(),
                DatabaseEntry::new(subtree.object_id()?, EntryMode::Directory),
            );
            tree.pending.insert(name, subtree);
        }

        Ok(tree)
    }

    /// Visit every pending subtree children-first, then this tree
    ///
    /// Child IDs are embedded in the parent, so children must be stored before
    /// the parent for the database to stay closed under references.
    pub fn traverse<F>(&self, func: &mut F) -> anyhow::Result<()>
    where
        F: FnMut(&Tree) -> anyhow::Result<()>,
    {
        for subtree in self.pending.values() {
            subtree.traverse(func)?;
        }
        func(self)
    }

    /// Members in ascending name order
    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.entries.iter()
    }

    pub fn entry(&self, name: &str) -> Option<&DatabaseEntry> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a repository-relative path into its UTF-8 segments
pub(crate) fn path_segments(path: &Path) -> anyhow::Result<Vec<String>> {
    path.components()
        .map(|component| match component {
            Component::Normal(segment) => segment
                .to_str()
                .map(str::to_owned)
                .with_context(|| format!("Invalid path segment in {}", path.display())),
            _ => Err(anyhow::anyhow!(
                "Path {} is not repository-relative",
                path.display()
            )),
        })
        .collect()
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut ordered = self
            .entries
            .iter()
            .map(|(name, entry)| {
                let key = if entry.is_tree() {
                    format!("{name}/")
                } else {
                    name.clone()
                };
                (key, name, entry)
            })
            .collect::<Vec<_>>();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let mut content = Vec::new();
        for (_, name, entry) in ordered {
            content.extend_from_slice(format!("{} {}", entry.mode.as_str(), name).as_bytes());
            content.push(0);
            entry.oid.write_binary_to(&mut content)?;
        }

        Ok(frame(&self.object_type(), &content))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                anyhow::bail!("unexpected EOF in mode");
            }
            let mode = EntryMode::from_octal_str(std::str::from_utf8(&mode_bytes)?)?;

            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                anyhow::bail!("unexpected EOF in name");
            }
            let name = std::str::from_utf8(&name_bytes)?.to_owned();

            let oid =
                ObjectId::read_binary_from(&mut reader).context("unexpected EOF in object id")?;

            entries.insert(name, DatabaseEntry::new(oid, mode));
        }

        Ok(Tree {
            entries,
            pending: BTreeMap::new(),
        })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
