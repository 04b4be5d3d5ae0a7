//! Object identifier (SHA-1 hash)
//!
//! An object ID is the 20-byte SHA-1 digest of an object's serialized form.
//! Two objects with equal IDs are treated as having equal content, which lets
//! the checkout engine compare snapshots and staged entries without reading
//! any file data.
//!
//! ## Format
//!
//! - Binary: 20 raw bytes (inside tree objects and index entries)
//! - Text: 40 lowercase hex characters
//! - Short: first 7 hex characters
//!
//! ## Storage
//!
//! Loose objects live at `.git/objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::objects::{OBJECT_ID_BYTES, OBJECT_ID_LENGTH};
use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;

/// Content identifier of a stored object.
///
/// Equality is byte-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_BYTES]);

impl ObjectId {
    pub fn from_digest(digest: [u8; OBJECT_ID_BYTES]) -> Self {
        Self(digest)
    }

    /// Parse and validate an object ID from its 40-character hex form
    pub fn try_parse(id: impl AsRef<str>) -> anyhow::Result<Self> {
        let id = id.as_ref();
        if id.len() != OBJECT_ID_LENGTH {
            anyhow::bail!("Invalid object ID length: {}", id.len());
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Invalid object ID characters: {}", id);
        }

        let mut bytes = [0u8; OBJECT_ID_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&id[i * 2..i * 2 + 2], 16)?;
        }

        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_BYTES] {
        &self.0
    }

    /// Write the raw 20 bytes, as embedded in tree objects and index entries
    pub fn write_binary_to<W: io::Write + ?Sized>(&self, writer: &mut W) -> anyhow::Result<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }

    /// Read the raw 20 bytes written by [`ObjectId::write_binary_to`]
    pub fn read_binary_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut bytes = [0u8; OBJECT_ID_BYTES];
        reader.read_exact(&mut bytes)?;

        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .fold(String::with_capacity(OBJECT_ID_LENGTH), |mut hex, byte| {
                let _ = write!(hex, "{byte:02x}");
                hex
            })
    }

    /// Loose object location, split as `XX/YYYYYY...`
    pub fn to_path(&self) -> PathBuf {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        PathBuf::from(dir).join(file)
    }

    pub fn to_short_oid(&self) -> String {
        self.to_hex()[..7].to_string()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for ObjectId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}
