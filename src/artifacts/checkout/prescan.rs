//! Classification pass of checkout
//!
//! Walks the index against the target tree (and the prior tree, when there
//! is one) and sorts every affected path into `conflicts`, `removed` or
//! `updated`. Nothing is written: the working directory is only inspected.
//!
//! When the walk is over the three sets are disjoint, conflicts winning over
//! the other two.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::{PathKind, Workspace};
use crate::artifacts::checkout::conflict::{ConflictReport, ConflictType};
use crate::artifacts::checkout::decision::{Decision, decide};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::walk::tree_walker::{Sources, TreeVisitor, TreeWalker, WalkEntry};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prescan {
    /// Paths that cannot be reconciled without losing data
    pub conflicts: BTreeMap<PathBuf, ConflictType>,
    /// Paths to delete from the working directory and the index
    pub removed: BTreeSet<PathBuf>,
    /// Paths to write from the merge tree, with the entry to write
    pub updated: BTreeMap<PathBuf, DatabaseEntry>,
}

impl Prescan {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Nothing to do at all
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    pub fn report(&self) -> ConflictReport {
        ConflictReport::new(self.conflicts.clone())
    }

    fn add_conflict(&mut self, path: &Path, kind: ConflictType) {
        tracing::trace!(path = %path.display(), ?kind, "conflict");
        self.conflicts.entry(path.to_path_buf()).or_insert(kind);
    }

    fn remove_conflicts_in_removed(&mut self) {
        let removed = &self.removed;
        self.conflicts.retain(|path, _| !removed.contains(path));
    }
}

/// Reconcile the index directly with `merge`
pub fn scan_one_source(
    workspace: &Workspace,
    database: &Database,
    index: &Index,
    merge: &Tree,
) -> anyhow::Result<Prescan> {
    let mut scan = Scan::new(workspace, database, index, None, merge);
    TreeWalker::new(database, index).walk(None, Some(merge), &mut scan)?;

    let mut prescan = scan.prescan;
    prescan.remove_conflicts_in_removed();
    let conflicts = &prescan.conflicts;
    prescan.updated.retain(|path, _| !conflicts.contains_key(path));

    tracing::debug!(
        conflicts = prescan.conflicts.len(),
        removed = prescan.removed.len(),
        updated = prescan.updated.len(),
        "one-source prescan finished"
    );
    Ok(prescan)
}

/// Three-way classification of the index against `head` and `merge`
pub fn scan_two_sources(
    workspace: &Workspace,
    database: &Database,
    index: &Index,
    head: &Tree,
    merge: &Tree,
) -> anyhow::Result<Prescan> {
    let mut scan = Scan::new(workspace, database, index, Some(head), merge);
    TreeWalker::new(database, index).walk(Some(head), Some(merge), &mut scan)?;

    let Scan { mut prescan, .. } = scan;
    let conflicts = &prescan.conflicts;
    prescan.removed.retain(|path| !conflicts.contains_key(path));

    // new files must not land on untracked content
    let untracked_targets = prescan
        .updated
        .keys()
        .filter(|path| index.entry_by_path(path).is_none())
        .cloned()
        .collect::<Vec<_>>();
    for path in untracked_targets {
        match workspace.kind(&path)? {
            PathKind::File => prescan.add_conflict(&path, ConflictType::UntrackedOverwritten),
            _ => check_conflicts_with_file(workspace, &path, &mut prescan)?,
        }
    }

    prescan.remove_conflicts_in_removed();
    let conflicts = &prescan.conflicts;
    prescan.updated.retain(|path, _| !conflicts.contains_key(path));

    tracing::debug!(
        conflicts = prescan.conflicts.len(),
        removed = prescan.removed.len(),
        updated = prescan.updated.len(),
        "two-source prescan finished"
    );
    Ok(prescan)
}

/// Something occupies the space `path` needs
///
/// A directory at `path` puts every file beneath it in conflict. Otherwise the
/// nearest ancestor that is a plain file is the conflict.
fn check_conflicts_with_file(
    workspace: &Workspace,
    path: &Path,
    prescan: &mut Prescan,
) -> anyhow::Result<()> {
    if workspace.kind(path)? == PathKind::Directory {
        for file in workspace.list_files(path)? {
            prescan.add_conflict(&file, ConflictType::UntrackedRemoved);
        }
        return Ok(());
    }

    for parent in path.ancestors().skip(1) {
        if parent.as_os_str().is_empty() {
            break;
        }
        match workspace.kind(parent)? {
            PathKind::Directory => break,
            PathKind::File => {
                prescan.add_conflict(parent, ConflictType::BlockingFile);
                break;
            }
            PathKind::Absent => continue,
        }
    }

    Ok(())
}

struct Scan<'r> {
    workspace: &'r Workspace,
    database: &'r Database,
    index: &'r Index,
    head: Option<&'r Tree>,
    merge: &'r Tree,
    prescan: Prescan,
}

impl<'r> Scan<'r> {
    fn new(
        workspace: &'r Workspace,
        database: &'r Database,
        index: &'r Index,
        head: Option<&'r Tree>,
        merge: &'r Tree,
    ) -> Self {
        Scan {
            workspace,
            database,
            index,
            head,
            merge,
            prescan: Prescan::default(),
        }
    }

    fn visit_one_source(&mut self, entry: WalkEntry<'_>) -> anyhow::Result<()> {
        let kind = self.workspace.kind(entry.path)?;

        match (entry.merge, entry.index) {
            (Some(merge), index) => {
                if kind != PathKind::File {
                    check_conflicts_with_file(self.workspace, entry.path, &mut self.prescan)?;
                }

                let needs_write = match index {
                    None => true,
                    Some(index) => index.oid != merge.oid || index.is_modified(self.workspace)?,
                };
                if needs_write {
                    self.prescan.updated.insert(entry.path.to_path_buf(), merge);
                }
            }
            (None, Some(_)) => {
                if kind == PathKind::Directory {
                    check_conflicts_with_file(self.workspace, entry.path, &mut self.prescan)?;
                }
                if kind != PathKind::Absent {
                    self.prescan.removed.insert(entry.path.to_path_buf());
                    self.prescan.conflicts.remove(entry.path);
                }
            }
            (None, None) => {}
        }

        Ok(())
    }

    fn visit_two_sources(&mut self, entry: WalkEntry<'_>) -> anyhow::Result<()> {
        let decision = decide(
            entry.index.map(|e| e.oid),
            entry.head.map(|e| e.oid),
            entry.merge.map(|e| e.oid),
            || self.has_parent_blob(entry.path),
            || match entry.index {
                Some(index) => index.is_modified(self.workspace),
                None => Ok(false),
            },
        )?;
        tracing::trace!(path = %entry.path.display(), ?decision, "classified");

        let path = entry.path.to_path_buf();
        match (decision, entry.merge) {
            (Decision::Keep, _) => {}
            (Decision::Update, Some(merge)) => {
                self.prescan.updated.insert(path, merge);
            }
            (Decision::Update, None) => {
                anyhow::bail!("{} has no content to check out", path.display())
            }
            (Decision::Remove, _) => {
                self.check_directory_in_the_way(&path)?;
                self.prescan.removed.insert(path);
            }
            (Decision::Conflict, _) => {
                self.prescan.add_conflict(&path, ConflictType::StaleFile);
                self.check_directory_in_the_way(&path)?;
            }
        }

        Ok(())
    }

    /// A directory where a tracked file is about to go puts its files in conflict
    fn check_directory_in_the_way(&mut self, path: &Path) -> anyhow::Result<()> {
        if self.workspace.kind(path)? == PathKind::Directory {
            check_conflicts_with_file(self.workspace, path, &mut self.prescan)?;
        }

        Ok(())
    }

    /// Whether some ancestor of `path` is a file in the merge tree
    fn has_parent_blob(&self, path: &Path) -> anyhow::Result<bool> {
        for parent in path.ancestors().skip(1) {
            if parent.as_os_str().is_empty() {
                break;
            }
            if self.database.lookup_blob(self.merge, parent)?.is_some() {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

impl TreeVisitor for Scan<'_> {
    fn visit_entry(&mut self, entry: WalkEntry<'_>) -> anyhow::Result<()> {
        if self.head.is_some() {
            self.visit_two_sources(entry)
        } else {
            self.visit_one_source(entry)
        }
    }

    fn finish_directory(&mut self, path: &Path, sources: Sources) -> anyhow::Result<()> {
        // the merge tree turns a tracked file into a directory
        if self.head.is_some()
            && sources.contains(Sources::MERGE)
            && self.index.entry_by_path(path).is_some()
        {
            self.prescan.removed.insert(path.to_path_buf());
        }

        Ok(())
    }
}
