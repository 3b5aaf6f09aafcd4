//! The mounted file system and its inode-level operations.

mod bitmap;
mod debug;
mod io;

pub use bitmap::FreeMap;

use std::io::Write;

use tracing::{debug, warn};

use crate::disk::Disk;
use crate::error::{Result, SfsError};
use crate::layout::{Block, INODES_PER_BLOCK, Inode, POINTERS_PER_BLOCK, SuperBlock, geometry};

/// Metadata held while mounted: the cached superblock and the free-block map.
struct MountState {
    meta: SuperBlock,
    free: FreeMap,
}

/// A file system over one disk image.
///
/// Starts unmounted; `format` and `debug` work in either state, everything
/// else requires a successful [`FileSystem::mount`]. Instances over
/// different disks are independent; there is no global state.
pub struct FileSystem {
    disk: Disk,
    state: Option<MountState>,
}

impl FileSystem {
    #[must_use]
    pub const fn new(disk: Disk) -> Self {
        Self { disk, state: None }
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub const fn disk(&self) -> &Disk {
        &self.disk
    }

    /// Lays down a fresh image: superblock in block 0, everything else
    /// zeroed. Does not mount.
    ///
    /// # Errors
    /// Rejected while mounted. A failed block write aborts with no rollback.
    pub fn format(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Err(SfsError::AlreadyMounted);
        }

        let geom = geometry(self.disk.blocks());
        let mut block = Block::zeroed();
        block.put_superblock(&SuperBlock::for_geometry(&geom));
        self.disk.write(0, block.as_bytes())?;

        let empty = Block::zeroed();
        for b in 1..self.disk.blocks() {
            self.disk.write(b, empty.as_bytes())?;
        }
        debug!(
            blocks = geom.blocks,
            inode_blocks = geom.inode_blocks,
            "formatted disk image"
        );
        Ok(())
    }

    /// Verifies the on-disk superblock and reconstructs the free-block map
    /// from the inode table.
    ///
    /// # Errors
    /// Rejected while mounted; any superblock mismatch fails with
    /// [`SfsError::BadGeometry`] and no state change.
    pub fn mount(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Err(SfsError::AlreadyMounted);
        }

        let mut block = Block::zeroed();
        self.disk.read(0, block.as_bytes_mut())?;
        let meta = block.superblock();

        if !meta.magic_valid() {
            return Err(SfsError::BadGeometry("magic number mismatch"));
        }
        if meta.blocks as usize != self.disk.blocks() {
            return Err(SfsError::BadGeometry("block count disagrees with disk"));
        }
        let geom = geometry(self.disk.blocks());
        if meta.inode_blocks as usize != geom.inode_blocks {
            return Err(SfsError::BadGeometry("inode block count breaks the layout rule"));
        }
        if meta.inodes as usize != geom.inodes {
            return Err(SfsError::BadGeometry("inode count disagrees with inode blocks"));
        }

        let free = self.rebuild_free_map(&meta)?;
        debug!(
            blocks = meta.blocks,
            inodes = meta.inodes,
            free = free.free_count(),
            "mounted"
        );
        self.state = Some(MountState { meta, free });
        Ok(())
    }

    /// Walks the inode table and marks every referenced block as in use.
    /// Built off to the side so a failed mount leaves no trace.
    fn rebuild_free_map(&mut self, meta: &SuperBlock) -> Result<FreeMap> {
        let mut free = FreeMap::all_free(meta.blocks as usize);
        for b in 0..=meta.inode_blocks as usize {
            free.mark_used(b);
        }

        let mut table = Block::zeroed();
        let mut pointers = Block::zeroed();
        for table_block in 1..=meta.inode_blocks as usize {
            self.disk.read(table_block, table.as_bytes_mut())?;
            for slot in 0..INODES_PER_BLOCK {
                let inode = table.inode(slot);
                if !inode.valid {
                    continue;
                }
                for &ptr in &inode.direct {
                    if ptr != 0 {
                        free.mark_used(ptr as usize);
                    }
                }
                if inode.indirect != 0 {
                    free.mark_used(inode.indirect as usize);
                    self.disk.read(inode.indirect as usize, pointers.as_bytes_mut())?;
                    for index in 0..POINTERS_PER_BLOCK {
                        let ptr = pointers.pointer(index);
                        if ptr != 0 {
                            free.mark_used(ptr as usize);
                        }
                    }
                }
            }
        }
        Ok(free)
    }

    /// Forgets the mount state. Idempotent; never touches the disk.
    pub fn unmount(&mut self) {
        self.state = None;
    }

    /// Claims the first invalid inode slot and persists its table block.
    ///
    /// # Errors
    /// [`SfsError::InodeTableFull`] when every slot is valid.
    pub fn create(&mut self) -> Result<usize> {
        let Some(state) = self.state.as_ref() else {
            return Err(SfsError::NotMounted);
        };
        let inode_blocks = state.meta.inode_blocks as usize;

        let mut table = Block::zeroed();
        for table_block in 1..=inode_blocks {
            self.disk.read(table_block, table.as_bytes_mut())?;
            for slot in 0..INODES_PER_BLOCK {
                if table.inode(slot).valid {
                    continue;
                }
                let mut inode = Inode::empty();
                inode.valid = true;
                table.put_inode(slot, &inode);
                self.disk.write(table_block, table.as_bytes())?;
                return Ok((table_block - 1) * INODES_PER_BLOCK + slot);
            }
        }
        warn!("inode table is full");
        Err(SfsError::InodeTableFull)
    }

    /// Invalidates an inode, returning every block it referenced to the
    /// free pool. Freed data blocks keep their bytes on disk.
    ///
    /// # Errors
    /// [`SfsError::BadInode`] when out of range or already invalid.
    pub fn remove(&mut self, inode_number: usize) -> Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Err(SfsError::NotMounted);
        };
        let mut inode = io::load_inode(&mut self.disk, &state.meta, inode_number)?;

        for ptr in &mut inode.direct {
            if *ptr != 0 {
                state.free.release(*ptr as usize);
                *ptr = 0;
            }
        }
        if inode.indirect != 0 {
            let mut pointers = Block::zeroed();
            self.disk.read(inode.indirect as usize, pointers.as_bytes_mut())?;
            for index in 0..POINTERS_PER_BLOCK {
                let ptr = pointers.pointer(index);
                if ptr != 0 {
                    state.free.release(ptr as usize);
                }
            }
            state.free.release(inode.indirect as usize);
            inode.indirect = 0;
        }

        inode.valid = false;
        inode.size = 0;
        io::save_inode(&mut self.disk, inode_number, &inode)
    }

    /// Size in bytes of a valid inode.
    ///
    /// # Errors
    /// [`SfsError::BadInode`] when out of range or invalid.
    pub fn stat(&mut self, inode_number: usize) -> Result<u32> {
        let Some(state) = self.state.as_ref() else {
            return Err(SfsError::NotMounted);
        };
        let inode = io::load_inode(&mut self.disk, &state.meta, inode_number)?;
        Ok(inode.size)
    }

    /// Reads up to `buf.len()` bytes starting at `offset`, returning the
    /// count actually copied (zero at or past end of file).
    ///
    /// # Errors
    /// [`SfsError::BadInode`] when out of range or invalid.
    pub fn read(&mut self, inode_number: usize, buf: &mut [u8], offset: usize) -> Result<usize> {
        let Some(state) = self.state.as_ref() else {
            return Err(SfsError::NotMounted);
        };
        let inode = io::load_inode(&mut self.disk, &state.meta, inode_number)?;
        io::read_at(&mut self.disk, &inode, buf, offset)
    }

    /// Writes `data` at `offset`, allocating blocks on demand; running out
    /// of free blocks yields a successful partial write.
    ///
    /// # Errors
    /// [`SfsError::BadInode`] when out of range or invalid.
    pub fn write(&mut self, inode_number: usize, data: &[u8], offset: usize) -> Result<usize> {
        let Some(state) = self.state.as_mut() else {
            return Err(SfsError::NotMounted);
        };
        let mut inode = io::load_inode(&mut self.disk, &state.meta, inode_number)?;
        let written = io::write_at(&mut self.disk, &mut state.free, &mut inode, data, offset)?;
        io::save_inode(&mut self.disk, inode_number, &inode)?;
        Ok(written)
    }

    /// Reports the superblock and every valid inode to `out`. Works in any
    /// state; reads the disk directly rather than the cached metadata.
    ///
    /// # Errors
    /// Fails only when the disk or `out` does.
    pub fn debug(&mut self, out: &mut impl Write) -> Result<()> {
        debug::dump(&mut self.disk, out)
    }

    /// Whether `block` is free right now. Mounted state only.
    #[must_use]
    pub fn block_is_free(&self, block: usize) -> bool {
        self.state.as_ref().is_some_and(|s| s.free.is_free(block))
    }

    /// Free data blocks remaining. Mounted state only.
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.free.free_count())
    }
}
