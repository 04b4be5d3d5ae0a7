//! Tree walker
//!
//! Walks the index and the head and merge trees together, depth-first, one
//! directory level at a time. At every level the names found in any source
//! are visited in ascending order:
//!
//! - when some source holds a file under the name, the visitor receives one
//!   [`WalkEntry`] carrying each source's file entry (`None` where that source
//!   has no file by this name)
//! - when some source holds a directory under the name, the walker descends
//!   into it and afterwards reports [`TreeVisitor::finish_directory`] with the
//!   set of sources the directory was found in
//!
//! A name that is a file in one source and a directory in another produces
//! both, the file first. Subtrees are loaded from the database only when the
//! walk reaches them.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bitflags::bitflags;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};

macro_rules! walk_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_walk")]
        {
            tracing::trace!($($arg)*);
        }
    };
}

bitflags! {
    /// Sources a directory was found in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Sources: u8 {
        const INDEX = 0b001;
        const HEAD = 0b010;
        const MERGE = 0b100;
    }
}

/// The file entries found under one path
#[derive(Debug, Clone, Copy)]
pub struct WalkEntry<'w> {
    pub path: &'w Path,
    pub index: Option<&'w IndexEntry>,
    pub head: Option<DatabaseEntry>,
    pub merge: Option<DatabaseEntry>,
}

pub trait TreeVisitor {
    fn visit_entry(&mut self, entry: WalkEntry<'_>) -> anyhow::Result<()>;

    /// Called once every path beneath `path` has been visited
    fn finish_directory(&mut self, _path: &Path, _sources: Sources) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct TreeWalker<'r> {
    database: &'r Database,
    index: &'r Index,
}

impl<'r> TreeWalker<'r> {
    pub fn new(database: &'r Database, index: &'r Index) -> Self {
        TreeWalker { database, index }
    }

    pub fn walk(
        &self,
        head: Option<&Tree>,
        merge: Option<&Tree>,
        visitor: &mut impl TreeVisitor,
    ) -> anyhow::Result<()> {
        let entries = self.index.entries().collect::<Vec<_>>();
        self.walk_level(Path::new(""), &entries, head, merge, visitor)
    }

    fn walk_level(
        &self,
        prefix: &Path,
        index_entries: &[&'r IndexEntry],
        head: Option<&Tree>,
        merge: Option<&Tree>,
        visitor: &mut impl TreeVisitor,
    ) -> anyhow::Result<()> {
        let mut index_files: BTreeMap<String, &'r IndexEntry> = BTreeMap::new();
        let mut index_dirs: BTreeMap<String, Vec<&'r IndexEntry>> = BTreeMap::new();

        for &entry in index_entries {
            let (name, nested) = Self::split_first(prefix, &entry.name)?;
            if nested {
                index_dirs.entry(name).or_default().push(entry);
            } else {
                index_files.insert(name, entry);
            }
        }

        let names = index_files
            .keys()
            .chain(index_dirs.keys())
            .chain(head.into_iter().flat_map(|tree| tree.entries().map(|(name, _)| name)))
            .chain(merge.into_iter().flat_map(|tree| tree.entries().map(|(name, _)| name)))
            .cloned()
            .collect::<BTreeSet<_>>();

        for name in names {
            let path = prefix.join(&name);
            let head_entry = head.and_then(|tree| tree.entry(&name)).copied();
            let merge_entry = merge.and_then(|tree| tree.entry(&name)).copied();

            let index_file = index_files.get(&name).copied();
            let head_blob = head_entry.filter(DatabaseEntry::is_blob);
            let merge_blob = merge_entry.filter(DatabaseEntry::is_blob);

            if index_file.is_some() || head_blob.is_some() || merge_blob.is_some() {
                walk_trace!(path = %path.display(), index = index_file.is_some(), head = head_blob.is_some(), merge = merge_blob.is_some(), "visit");
                visitor.visit_entry(WalkEntry {
                    path: &path,
                    index: index_file,
                    head: head_blob,
                    merge: merge_blob,
                })?;
            }

            let index_children = index_dirs.remove(&name).unwrap_or_default();
            let head_tree = head_entry.filter(DatabaseEntry::is_tree);
            let merge_tree = merge_entry.filter(DatabaseEntry::is_tree);

            let mut sources = Sources::empty();
            sources.set(Sources::INDEX, !index_children.is_empty());
            sources.set(Sources::HEAD, head_tree.is_some());
            sources.set(Sources::MERGE, merge_tree.is_some());
            if sources.is_empty() {
                continue;
            }

            let head_subtree = head_tree
                .map(|entry| self.database.load_tree(&entry.oid))
                .transpose()?;
            let merge_subtree = merge_tree
                .map(|entry| self.database.load_tree(&entry.oid))
                .transpose()?;

            self.walk_level(
                &path,
                &index_children,
                head_subtree.as_ref(),
                merge_subtree.as_ref(),
                visitor,
            )?;

            walk_trace!(path = %path.display(), sources = ?sources, "leave");
            visitor.finish_directory(&path, sources)?;
        }

        Ok(())
    }

    /// First segment of `path` below `prefix`, and whether more segments follow
    fn split_first(prefix: &Path, path: &Path) -> anyhow::Result<(String, bool)> {
        let rest = path
            .strip_prefix(prefix)
            .with_context(|| format!("{} is not under {}", path.display(), prefix.display()))?;
        let mut components = rest.components();

        let name = match components.next() {
            Some(Component::Normal(name)) => name
                .to_str()
                .with_context(|| format!("Invalid path segment in {}", path.display()))?,
            _ => anyhow::bail!("Index entry {} is not repository-relative", path.display()),
        };

        Ok((name.to_owned(), components.next().is_some()))
    }
}
