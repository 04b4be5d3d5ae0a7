//! Index entry representation
//!
//! Each entry in the index represents a tracked file with:
//! - File path
//! - Content hash (object ID)
//! - File metadata (mode, size, timestamps)
//!
//! ## Entry Format
//!
//! Entries are stored in a binary format with 8-byte alignment for efficient reading.
//! Metadata includes both file status (mode, size) and timestamps (mtime, ctime)
//! which enable fast change detection without reading file content.

use crate::areas::workspace::Workspace;
use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::cmp::min;
use std::fs::Metadata;
use std::io::{BufRead, Write};
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Maximum path length recorded in the entry flags
const MAX_PATH_SIZE: usize = 0xfff;

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Minimum size of an index entry in bytes
pub const ENTRY_MIN_SIZE: usize = 64;

/// Offset of the path name inside a serialized entry
const NAME_OFFSET: usize = 62;

/// Index entry representing a tracked file
///
/// Contains the file path, content hash, and metadata needed for
/// efficient change detection.
#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// File path relative to repository root
    pub name: PathBuf,
    /// SHA-1 hash of file content
    pub oid: ObjectId,
    /// File metadata (mode, size, timestamps)
    pub metadata: EntryMetadata,
}

impl IndexEntry {
    /// Ancestor directories from the outermost to the direct parent
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .name
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();

        dirs
    }

    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime
            && self.metadata.ctime_nsec == other.ctime_nsec
            && self.metadata.mtime == other.mtime
            && self.metadata.mtime_nsec == other.mtime_nsec
    }

    /// Whether the working copy no longer holds the content recorded here
    ///
    /// Metadata is compared first. When size and mode agree but timestamps
    /// don't, the file is re-hashed so a touch without an edit is not reported
    /// as a modification. A missing path, or a directory at the path, counts
    /// as modified.
    pub fn is_modified(&self, workspace: &Workspace) -> anyhow::Result<bool> {
        let stat = match workspace.try_stat_file(&self.name)? {
            Some(stat) if !stat.mode.is_tree() => stat,
            _ => return Ok(true),
        };

        if !self.stat_match(&stat) {
            return Ok(true);
        }
        if self.times_match(&stat) {
            return Ok(false);
        }

        let content = workspace.read_file(&self.name)?;
        Ok(Blob::new(content).object_id()? != self.oid)
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for IndexEntry {}

impl PartialOrd for IndexEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// File metadata stored in index entries
///
/// - `ctime`: File status change time (inode modification)
/// - `mtime`: File content modification time
///
/// Both include nanosecond precision for accurate change detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: i64,
    pub ctime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub dev: u64,
    pub ino: u64,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self
            .name
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid entry name"))?;
        let flags = min(entry_name.len(), MAX_PATH_SIZE) as u16;

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_binary_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(flags)?;
        entry_bytes.write_all(entry_name.as_bytes())?;

        // at least one NUL terminates the name, then pad to the block size
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        if bytes.len() < ENTRY_MIN_SIZE {
            anyhow::bail!("Invalid index entry size");
        }

        let read_u32 = |at: usize| byteorder::NetworkEndian::read_u32(&bytes[at..at + 4]);

        let mut oid_bytes = &bytes[40..60];
        let oid = ObjectId::read_binary_from(&mut oid_bytes)?;

        let name_end = bytes[NAME_OFFSET..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("Missing null terminator in entry name"))?;
        let name = std::str::from_utf8(&bytes[NAME_OFFSET..NAME_OFFSET + name_end])
            .map_err(|_| anyhow::anyhow!("Invalid UTF-8 in entry name"))?;

        Ok(IndexEntry {
            name: PathBuf::from(name),
            oid,
            metadata: EntryMetadata {
                ctime: read_u32(0) as i64,
                ctime_nsec: read_u32(4) as i64,
                mtime: read_u32(8) as i64,
                mtime_nsec: read_u32(12) as i64,
                dev: read_u32(16) as u64,
                ino: read_u32(20) as u64,
                mode: EntryMode::try_from(read_u32(24))?,
                uid: read_u32(28),
                gid: read_u32(32),
                size: read_u32(36) as u64,
            },
        })
    }
}

impl EntryMetadata {
    /// Build from a live `stat`, where `full_path` locates the file on disk
    pub fn from_metadata(full_path: &Path, metadata: &Metadata) -> Self {
        let mode = if metadata.is_dir() {
            EntryMode::Directory
        } else if full_path.is_executable() {
            EntryMode::File(FileMode::Executable)
        } else {
            EntryMode::File(FileMode::Regular)
        };

        // the index stores 32-bit fields, so compare on what survives a round trip
        Self {
            ctime: metadata.ctime() as u32 as i64,
            ctime_nsec: metadata.ctime_nsec() as u32 as i64,
            mtime: metadata.mtime() as u32 as i64,
            mtime_nsec: metadata.mtime_nsec() as u32 as i64,
            dev: metadata.dev() as u32 as u64,
            ino: metadata.ino() as u32 as u64,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32 as u64,
        }
    }
}
