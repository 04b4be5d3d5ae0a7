//! Plumbing commands
//!
//! - `write-tree`: record the index as tree objects
//! - `read-tree`: check out one or two trees into the working directory
//! - `ls-tree`: list the contents of a tree object

pub mod ls_tree;
pub mod read_tree;
pub mod write_tree;
