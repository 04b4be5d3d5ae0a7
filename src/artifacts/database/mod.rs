//! Database entry types
//!
//! Entries of trees read back from the object database: an object ID plus the
//! mode that says whether it names a blob or a subtree.

pub mod database_entry;
