//! Blob object
//!
//! Blobs store file content only. Names and permissions belong to the tree
//! entry that points at the blob.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

/// File content as stored in the object database
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl From<&[u8]> for Blob {
    fn from(content: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(content))
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(frame(&self.object_type(), &self.content))
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been consumed
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;

        Ok(Self::new(content.into()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blob_id_matches_git() {
        let blob = Blob::from(b"hello\n".as_slice());

        assert_eq!(
            blob.object_id().unwrap().to_string(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn binary_content_is_preserved() {
        let content = [0u8, 159, 146, 150, 255];
        let blob = Blob::from(content.as_slice());

        let serialized = blob.serialize().unwrap();
        let mut reader = std::io::Cursor::new(serialized);
        ObjectType::parse_object_type(&mut reader).unwrap();

        assert_eq!(Blob::deserialize(reader).unwrap().content(), &content);
    }
}
