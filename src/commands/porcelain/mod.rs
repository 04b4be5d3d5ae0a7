//! Porcelain commands
//!
//! - `init`: create the object store and an empty index
//! - `add`: hash files into the object store and stage them

pub mod add;
pub mod init;
