//! Data structures and algorithms
//!
//! - `checkout`: decision table, prescan and the checkout engine
//! - `database`: tree entry as loaded from the object store
//! - `index`: index entries, modes and checksummed index I/O
//! - `objects`: object IDs, blobs and trees
//! - `walk`: lock-step walk over the index and up to two trees

pub mod checkout;
pub mod database;
pub mod index;
pub mod objects;
pub mod walk;
