use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a path cannot be reconciled without losing data
///
/// Only used for reporting. A path keeps the first kind it was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictType {
    /// Local or staged changes would be overwritten or deleted
    StaleFile,
    /// An untracked file occupies a path the target creates
    UntrackedOverwritten,
    /// An untracked file sits inside a directory standing where the target
    /// needs a file
    UntrackedRemoved,
    /// A plain file stands where the target needs a directory
    BlockingFile,
}

impl ConflictType {
    pub const ALL: [ConflictType; 4] = [
        ConflictType::StaleFile,
        ConflictType::UntrackedOverwritten,
        ConflictType::UntrackedRemoved,
        ConflictType::BlockingFile,
    ];
}

#[derive(Debug)]
pub struct ConflictMessage {
    pub header: &'static str,
    pub footer: &'static str,
}

impl From<ConflictType> for ConflictMessage {
    fn from(value: ConflictType) -> Self {
        match value {
            ConflictType::StaleFile => Self {
                header: "Your local changes to the following files would be overwritten by checkout:",
                footer: "Please stage or discard your changes before checking out.",
            },
            ConflictType::UntrackedOverwritten => Self {
                header: "The following untracked working tree files would be overwritten by checkout:",
                footer: "Please move or remove them before checking out.",
            },
            ConflictType::UntrackedRemoved => Self {
                header: "The following untracked working tree files would be removed by checkout:",
                footer: "Please move or remove them before checking out.",
            },
            ConflictType::BlockingFile => Self {
                header: "The following files stand where checkout needs a directory:",
                footer: "Please move or remove them before checking out.",
            },
        }
    }
}

/// Every conflicting path of one checkout, in path order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    conflicts: BTreeMap<PathBuf, ConflictType>,
}

impl ConflictReport {
    pub fn new(conflicts: BTreeMap<PathBuf, ConflictType>) -> Self {
        ConflictReport { conflicts }
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.conflicts.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, ConflictType)> {
        self.conflicts.iter().map(|(path, kind)| (path.as_path(), *kind))
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        for kind in ConflictType::ALL {
            let paths = self
                .iter()
                .filter(|(_, k)| *k == kind)
                .map(|(path, _)| format!("\t{}", path.display()))
                .collect::<Vec<_>>();
            if paths.is_empty() {
                continue;
            }

            if !first {
                writeln!(f)?;
            }
            first = false;

            let ConflictMessage { header, footer } = kind.into();
            write!(f, "{}\n{}\n{}", header, paths.join("\n"), footer)?;
        }

        Ok(())
    }
}
