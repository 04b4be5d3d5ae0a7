//! SHA-1 trailer handling for the index file
//!
//! The index ends with the SHA-1 of everything before it. These adapters hash
//! bytes as they stream through so the trailer can be produced or checked
//! without buffering the whole file.

use crate::artifacts::index::CHECKSUM_SIZE;
use anyhow::anyhow;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

pub struct ChecksumReader<R> {
    inner: R,
    digest: Sha1,
}

impl<R: Read> ChecksumReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            digest: Sha1::new(),
        }
    }

    pub fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|_| anyhow!("Unexpected end-of-file while reading index"))?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Read the trailer and compare it with the digest of everything read so far
    pub fn verify(mut self) -> anyhow::Result<()> {
        let mut expected = [0u8; CHECKSUM_SIZE];
        self.inner
            .read_exact(&mut expected)
            .map_err(|_| anyhow!("Index file is missing its checksum"))?;

        if expected != self.digest.finalize().as_slice() {
            return Err(anyhow!("Checksum does not match value stored on disk"));
        }

        Ok(())
    }
}

pub struct ChecksumWriter<W> {
    inner: W,
    digest: Sha1,
}

impl<W: Write> ChecksumWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            digest: Sha1::new(),
        }
    }

    /// Append the trailer and flush
    pub fn finish(mut self) -> anyhow::Result<W> {
        let checksum = self.digest.clone().finalize();
        self.inner
            .write_all(checksum.as_slice())
            .map_err(|_| anyhow!("Failed to write checksum to index file"))?;
        self.inner.flush()?;

        Ok(self.inner)
    }
}

impl<W: Write> Write for ChecksumWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.digest.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
