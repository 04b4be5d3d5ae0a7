//! Content-addressed objects
//!
//! Everything stored by the repository is an object identified by the SHA-1
//! hash of its serialized form. Only the two kinds the working tree is built
//! from live here:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (names, modes, and object IDs)
//!
//! All objects share the on-disk framing `<type> <size>\0<content>`.

pub mod blob;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in binary format
pub const OBJECT_ID_BYTES: usize = OBJECT_ID_LENGTH / 2;
