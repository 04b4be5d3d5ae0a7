//! Working-tree checkout for a git-compatible object store
//!
//! - `areas`: the object database, the index, the working directory and the
//!   repository tying them together
//! - `artifacts`: objects, index entries, the tree walker and the checkout
//!   engine
//! - `commands`: the operations exposed by the `bit` binary

pub mod areas;
pub mod artifacts;
pub mod commands;

#[cfg(test)]
mod fixtures;
