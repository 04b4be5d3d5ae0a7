//! Stateful repository components
//!
//! - `database`: loose object store for blobs and trees
//! - `index`: staging area recording what the working directory was built from
//! - `repository`: the three areas below tied together at a working root
//! - `workspace`: working directory file operations

pub mod database;
pub mod index;
pub mod repository;
pub mod workspace;
