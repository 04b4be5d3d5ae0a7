use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;

/// Name of the metadata directory at the working root
pub const GIT_DIR: &str = ".git";
const OBJECTS_DIR: &str = "objects";
const INDEX_FILE: &str = "index";

/// A working directory together with its object database and index
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
}

impl Repository {
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Unable to create {}", path.display()))?;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", path.display()))?;
        let git_path = path.join(GIT_DIR);

        Ok(Repository {
            writer: RefCell::new(writer),
            index: RefCell::new(Index::new(git_path.join(INDEX_FILE).into_boxed_path())),
            database: Database::new(git_path.join(OBJECTS_DIR).into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            path: path.into_boxed_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> std::path::PathBuf {
        self.path.join(GIT_DIR)
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Resolve a full or abbreviated object ID given on the command line
    pub fn resolve_object_id(&self, name: &str) -> anyhow::Result<ObjectId> {
        if let Ok(oid) = ObjectId::try_parse(name) {
            return Ok(oid);
        }

        let candidates = self
            .database
            .find_objects_by_prefix(name)
            .with_context(|| format!("Not a valid object name {name}"))?;

        match candidates.as_slice() {
            [oid] => Ok(*oid),
            [] => anyhow::bail!("Not a valid object name {name}"),
            _ => {
                let listing = candidates
                    .iter()
                    .map(|oid| format!("  {}", oid.to_short_oid()))
                    .collect::<Vec<_>>()
                    .join("\n");
                anyhow::bail!("Short object ID {name} is ambiguous, candidates are:\n{listing}")
            }
        }
    }

    /// Fail unless `init` has been run for this working directory
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if !self.database.objects_path().is_dir() {
            anyhow::bail!(
                "Not a repository (no {} directory in {})",
                GIT_DIR,
                self.path.display()
            );
        }

        Ok(())
    }
}
