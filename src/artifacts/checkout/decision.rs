//! Three-way decision for a single path
//!
//! Given the content IDs the index (`I`), the head tree (`H`) and the merge
//! tree (`M`) hold for one path, decide what checkout does with it:
//!
//! | I | H | M | condition | result |
//! |---|---|---|---|---|
//! | - | - | x | | update |
//! | - | x | - | | remove |
//! | - | x | x | | update |
//! | x | - | - or = I | parent of the path is a blob in M | modified ? conflict : remove |
//! | x | - | - or = I | otherwise | keep |
//! | x | - | ≠ I | | conflict |
//! | x | x | - | H = I | modified ? conflict : remove |
//! | x | x | - | H ≠ I | conflict |
//! | x | x | x | all distinct | conflict |
//! | x | x | x | H = I, M ≠ I | modified ? conflict : update |
//! | x | x | x | otherwise | keep |
//!
//! Local changes are never discarded: a branch that would overwrite or remove
//! a file the working copy changed ends in a conflict instead. The working
//! copy and the merge tree are only consulted on the rows that need them.

use crate::artifacts::objects::object_id::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Leave the index entry and the working file alone
    Keep,
    /// Write the merge tree's content
    Update,
    /// Delete the file and its index entry
    Remove,
    Conflict,
}

pub fn decide(
    index: Option<ObjectId>,
    head: Option<ObjectId>,
    merge: Option<ObjectId>,
    parent_is_merge_blob: impl FnOnce() -> anyhow::Result<bool>,
    modified: impl FnOnce() -> anyhow::Result<bool>,
) -> anyhow::Result<Decision> {
    let unless_modified = |decision: Decision, modified: bool| {
        if modified { Decision::Conflict } else { decision }
    };

    let decision = match (index, head, merge) {
        (None, None, None) => Decision::Keep,
        (None, None, Some(_)) => Decision::Update,
        (None, Some(_), None) => Decision::Remove,
        (None, Some(_), Some(_)) => Decision::Update,

        (Some(i), None, Some(m)) if m != i => Decision::Conflict,
        (Some(_), None, _) => {
            if parent_is_merge_blob()? {
                unless_modified(Decision::Remove, modified()?)
            } else {
                Decision::Keep
            }
        }

        (Some(i), Some(h), None) if h == i => unless_modified(Decision::Remove, modified()?),
        (Some(_), Some(_), None) => Decision::Conflict,

        (Some(i), Some(h), Some(m)) if h != m && h != i && m != i => Decision::Conflict,
        (Some(i), Some(h), Some(m)) if h == i && m != i => {
            unless_modified(Decision::Update, modified()?)
        }
        (Some(_), Some(_), Some(_)) => Decision::Keep,
    };

    Ok(decision)
}
