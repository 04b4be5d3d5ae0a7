//! Command implementations
//!
//! Each command is an `impl Repository` block. Commands are split the way
//! git splits them:
//!
//! - `plumbing`: direct access to trees and the checkout engine (write-tree,
//!   read-tree, ls-tree)
//! - `porcelain`: setting up a working directory and staging files (init, add)

pub mod plumbing;
pub mod porcelain;
