//! Block-addressed store backed by a host file.

#[cfg(test)]
mod disk_tests;

use memmap2::{MmapMut, MmapOptions};
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{Result, SfsError};
use crate::layout::BLOCK_SIZE;

/// A disk image of exactly `blocks * BLOCK_SIZE` bytes, read and written one
/// whole block at a time.
pub struct Disk {
    path: PathBuf,
    map: MmapMut,
    blocks: usize,
    reads: u64,
    writes: u64,
}

impl Disk {
    /// Creates or opens the image at `path` and sizes it to exactly
    /// `blocks` blocks.
    ///
    /// # Errors
    /// Returns an error if the image cannot be created/opened, provisioned,
    /// or mapped. No partially initialized disk escapes on failure.
    pub fn open(path: &Path, blocks: usize) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = blocks.checked_mul(BLOCK_SIZE).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("disk of {blocks} blocks exceeds addressable size"),
            )
        })?;
        file.set_len(len as u64)?;
        let map = unsafe { MmapOptions::new().len(len).map_mut(&file)? };

        Ok(Self {
            path: path.to_path_buf(),
            map,
            blocks,
            reads: 0,
            writes: 0,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of blocks in the image.
    #[must_use]
    pub const fn blocks(&self) -> usize {
        self.blocks
    }

    /// Reads performed since open. Not persisted.
    #[must_use]
    pub const fn reads(&self) -> u64 {
        self.reads
    }

    /// Writes performed since open. Not persisted.
    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.writes
    }

    fn block_range(&self, block: usize) -> Result<Range<usize>> {
        if block >= self.blocks {
            return Err(SfsError::BadBlock {
                block,
                blocks: self.blocks,
            });
        }
        let start = block * BLOCK_SIZE;
        Ok(start..start + BLOCK_SIZE)
    }

    /// Reads one whole block into `buf`.
    ///
    /// # Errors
    /// Returns [`SfsError::BadBlock`] when `block` is out of range.
    pub fn read(&mut self, block: usize, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        let range = self.block_range(block)?;
        buf.copy_from_slice(&self.map[range]);
        self.reads += 1;
        Ok(())
    }

    /// Writes one whole block from `buf`.
    ///
    /// # Errors
    /// Returns [`SfsError::BadBlock`] when `block` is out of range.
    pub fn write(&mut self, block: usize, buf: &[u8; BLOCK_SIZE]) -> Result<()> {
        let range = self.block_range(block)?;
        self.map[range].copy_from_slice(buf);
        self.writes += 1;
        Ok(())
    }
}
