//! Synchronized traversal of the index and up to two snapshot trees
//!
//! See [`tree_walker::TreeWalker`].

pub mod tree_walker;
