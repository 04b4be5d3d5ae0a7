//! Working tree checkout
//!
//! A checkout runs in two phases. The prescan classifies every affected path
//! without touching anything. Only then is the working directory changed:
//! conflicting and removed files are deleted along with the directories they
//! leave empty, and updated files are written from the merge tree.
//!
//! With a head tree the classification is three-way (see
//! [`decision`](crate::artifacts::checkout::decision)); without one the index
//! is reconciled directly with the merge tree and any file whose content is
//! not already in place gets written.
//!
//! ## Conflicts
//!
//! By default any conflict aborts the checkout before anything is written.
//! With [`CheckoutOptions::force`] conflicting files are deleted and, where
//! the merge tree has content for them, written afresh.
//!
//! A failure after the prescan leaves whatever was already written in place.
//! The index is updated in memory only; persisting it is up to the caller.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::checkout::conflict::ConflictType;
use crate::artifacts::checkout::error::CheckoutError;
use crate::artifacts::checkout::prescan::{Prescan, scan_one_source, scan_two_sources};
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::index::entry_mode::FileMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::walk::tree_walker::{TreeVisitor, TreeWalker, WalkEntry};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutOptions {
    /// Abort without writing anything when a conflict is found
    pub fail_on_conflict: bool,
}

impl Default for CheckoutOptions {
    fn default() -> Self {
        CheckoutOptions {
            fail_on_conflict: true,
        }
    }
}

impl CheckoutOptions {
    /// Overwrite conflicting paths instead of aborting
    pub fn force() -> Self {
        CheckoutOptions {
            fail_on_conflict: false,
        }
    }
}

/// What a checkout changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub written: usize,
    pub removed: usize,
    /// Conflicting paths whose local content was thrown away
    pub conflicts_discarded: usize,
}

pub struct Checkout<'r> {
    workspace: &'r Workspace,
    database: &'r Database,
    index: &'r mut Index,
    head: Option<Tree>,
    merge: Tree,
    options: CheckoutOptions,
    prescan: Prescan,
}

impl<'r> Checkout<'r> {
    pub fn new(
        workspace: &'r Workspace,
        database: &'r Database,
        index: &'r mut Index,
        head: Option<Tree>,
        merge: Tree,
        options: CheckoutOptions,
    ) -> Self {
        Checkout {
            workspace,
            database,
            index,
            head,
            merge,
            options,
            prescan: Prescan::default(),
        }
    }

    /// Check out the content recorded by another index
    ///
    /// The other index is written to the database as trees, then reconciled
    /// with `index` in one-source mode.
    pub fn from_index(
        workspace: &'r Workspace,
        database: &'r Database,
        index: &'r mut Index,
        target: &Index,
        options: CheckoutOptions,
    ) -> anyhow::Result<Self> {
        let tree_id = target.write_tree(database)?;
        let merge = database.load_tree(&tree_id)?;

        Ok(Self::new(workspace, database, index, None, merge, options))
    }

    pub fn conflicts(&self) -> &BTreeMap<PathBuf, ConflictType> {
        &self.prescan.conflicts
    }

    pub fn removed(&self) -> &BTreeSet<PathBuf> {
        &self.prescan.removed
    }

    pub fn updated(&self) -> &BTreeMap<PathBuf, DatabaseEntry> {
        &self.prescan.updated
    }

    /// Classify every path without changing anything
    pub fn prescan(&self) -> anyhow::Result<Prescan> {
        match &self.head {
            Some(head) => scan_two_sources(
                self.workspace,
                self.database,
                self.index,
                head,
                &self.merge,
            ),
            None => scan_one_source(self.workspace, self.database, self.index, &self.merge),
        }
    }

    pub fn checkout(&mut self) -> anyhow::Result<CheckoutSummary> {
        self.prescan = Prescan::default();
        let prescan = self.prescan()?;
        self.prescan = prescan;

        if !self.prescan.is_clean() && self.options.fail_on_conflict {
            tracing::debug!(conflicts = self.prescan.conflicts.len(), "aborting checkout");
            return Err(CheckoutError::Conflicts(self.prescan.report()).into());
        }

        self.clean_up_conflicts()?;

        let summary = if self.head.is_some() {
            self.checkout_two_trees()?
        } else {
            self.checkout_one_tree()?
        };

        tracing::debug!(
            written = summary.written,
            removed = summary.removed,
            conflicts_discarded = summary.conflicts_discarded,
            "checkout finished"
        );
        Ok(summary)
    }

    /// Delete conflicting and removed paths, deepest first
    ///
    /// Files inside a directory go before the directory itself, which by then
    /// has usually been pruned as empty.
    fn clean_up_conflicts(&self) -> anyhow::Result<()> {
        for path in self.prescan.conflicts.keys().rev() {
            match self.workspace.remove_file(path) {
                Ok(_) => self.workspace.remove_empty_parents(path)?,
                Err(source) => {
                    return Err(CheckoutError::CannotDelete {
                        path: path.clone(),
                        source,
                    }
                    .into());
                }
            }
        }

        for path in self.prescan.removed.iter().rev() {
            match self.workspace.remove_file(path) {
                Ok(_) => self.workspace.remove_empty_parents(path)?,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "unable to delete file")
                }
            }
        }

        Ok(())
    }

    fn checkout_two_trees(&mut self) -> anyhow::Result<CheckoutSummary> {
        let mut summary = CheckoutSummary::default();

        for path in &self.prescan.removed {
            self.index.remove(path)?;
            summary.removed += 1;
        }

        for path in self.prescan.conflicts.keys() {
            match self.database.lookup_blob(&self.merge, path)? {
                Some(entry) => {
                    Self::write_entry(self.workspace, self.database, self.index, path, &entry)?;
                    summary.written += 1;
                }
                None => self.index.remove(path)?,
            }
            summary.conflicts_discarded += 1;
        }

        for (path, entry) in &self.prescan.updated {
            Self::write_entry(self.workspace, self.database, self.index, path, entry)?;
            summary.written += 1;
        }

        Ok(summary)
    }

    /// Rewalk the index against the merge tree now that cleanup is done
    fn checkout_one_tree(&mut self) -> anyhow::Result<CheckoutSummary> {
        let mut plan = IndexSync::new(self.workspace);
        TreeWalker::new(self.database, self.index).walk(None, Some(&self.merge), &mut plan)?;

        let mut summary = CheckoutSummary {
            conflicts_discarded: self.prescan.conflicts.len(),
            ..Default::default()
        };

        for path in &plan.dropped {
            self.index.remove(path)?;
            summary.removed += 1;
        }

        for (path, entry) in &plan.writes {
            Self::write_entry(self.workspace, self.database, self.index, path, entry)?;
            summary.written += 1;
        }

        Ok(summary)
    }

    fn write_entry(
        workspace: &Workspace,
        database: &Database,
        index: &mut Index,
        path: &Path,
        entry: &DatabaseEntry,
    ) -> anyhow::Result<()> {
        let blob = database.load_blob(&entry.oid)?;
        let mode = FileMode::try_from(entry.mode)?;

        let metadata = workspace.write_file(path, blob.content(), mode)?;
        tracing::trace!(path = %path.display(), oid = %entry.oid, "checked out");

        index.add(IndexEntry::new(path.to_path_buf(), entry.oid, metadata))
    }
}

/// Index changes that bring the index in line with the merge tree
struct IndexSync<'r> {
    workspace: &'r Workspace,
    dropped: Vec<PathBuf>,
    writes: Vec<(PathBuf, DatabaseEntry)>,
}

impl<'r> IndexSync<'r> {
    fn new(workspace: &'r Workspace) -> Self {
        IndexSync {
            workspace,
            dropped: Vec::new(),
            writes: Vec::new(),
        }
    }
}

impl TreeVisitor for IndexSync<'_> {
    fn visit_entry(&mut self, entry: WalkEntry<'_>) -> anyhow::Result<()> {
        let Some(merge) = entry.merge else {
            if entry.index.is_some() {
                self.dropped.push(entry.path.to_path_buf());
            }
            return Ok(());
        };

        let needs_write = match entry.index {
            None => true,
            Some(index) => index.oid != merge.oid || index.is_modified(self.workspace)?,
        };
        if needs_write {
            self.writes.push((entry.path.to_path_buf(), merge));
        }

        Ok(())
    }
}
