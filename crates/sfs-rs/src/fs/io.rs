//! Inode I/O helpers and the block walk shared by read and write.

use tracing::debug;

use crate::disk::Disk;
use crate::error::{Result, SfsError};
use crate::layout::{BLOCK_SIZE, Block, Inode, POINTERS_PER_BLOCK, POINTERS_PER_INODE, SuperBlock};

use super::bitmap::FreeMap;

/// Pointer slot holding the block that covers one file-block index.
enum Slot {
    Direct(usize),
    Indirect(usize),
    OutOfRange,
}

const fn slot_for(file_block: usize) -> Slot {
    if file_block < POINTERS_PER_INODE {
        Slot::Direct(file_block)
    } else if file_block < POINTERS_PER_INODE + POINTERS_PER_BLOCK {
        Slot::Indirect(file_block - POINTERS_PER_INODE)
    } else {
        Slot::OutOfRange
    }
}

/// Loads inode `inode_number`, rejecting out-of-range numbers and invalid
/// slots with [`SfsError::BadInode`].
pub(super) fn load_inode(disk: &mut Disk, meta: &SuperBlock, inode_number: usize) -> Result<Inode> {
    if inode_number >= meta.inodes as usize {
        return Err(SfsError::BadInode(inode_number));
    }
    let (table_block, slot) = Inode::location(inode_number);
    let mut block = Block::zeroed();
    disk.read(table_block, block.as_bytes_mut())?;
    let inode = block.inode(slot);
    if !inode.valid {
        return Err(SfsError::BadInode(inode_number));
    }
    Ok(inode)
}

/// Writes `inode` back through its enclosing inode-table block.
pub(super) fn save_inode(disk: &mut Disk, inode_number: usize, inode: &Inode) -> Result<()> {
    let (table_block, slot) = Inode::location(inode_number);
    let mut block = Block::zeroed();
    disk.read(table_block, block.as_bytes_mut())?;
    block.put_inode(slot, inode);
    disk.write(table_block, block.as_bytes())
}

/// Copies up to `buf.len()` bytes out of the file, starting at `offset`.
///
/// The transfer is clamped at the inode's size and stops early at a zero
/// pointer (metadata short of the declared size); the bytes copied so far
/// are returned either way.
pub(super) fn read_at(
    disk: &mut Disk,
    inode: &Inode,
    buf: &mut [u8],
    offset: usize,
) -> Result<usize> {
    let size = inode.size as usize;
    if offset >= size {
        return Ok(0);
    }
    let want = buf.len().min(size - offset);

    let mut pointers = Block::zeroed();
    let mut pointers_loaded = false;
    let mut data = Block::zeroed();
    let mut copied = 0;
    while copied < want {
        let at = offset + copied;
        let target = match slot_for(at / BLOCK_SIZE) {
            Slot::Direct(k) => inode.direct[k],
            Slot::Indirect(_) if inode.indirect == 0 => 0,
            Slot::Indirect(k) => {
                if !pointers_loaded {
                    disk.read(inode.indirect as usize, pointers.as_bytes_mut())?;
                    pointers_loaded = true;
                }
                pointers.pointer(k)
            }
            Slot::OutOfRange => 0,
        };
        if target == 0 {
            break;
        }

        disk.read(target as usize, data.as_bytes_mut())?;
        let r = at % BLOCK_SIZE;
        let chunk = (BLOCK_SIZE - r).min(want - copied);
        buf[copied..copied + chunk].copy_from_slice(&data.as_bytes()[r..r + chunk]);
        copied += chunk;
    }
    Ok(copied)
}

/// Overwrites the file in place from `offset`, allocating data blocks (and
/// the indirect block) on demand.
///
/// Exhausting the free pool or the pointer range ends the walk; the bytes
/// already stored are a successful partial write. Grows the inode's size
/// only when the end of the write passes it. The caller persists the inode
/// afterwards, so data lands before metadata.
pub(super) fn write_at(
    disk: &mut Disk,
    free: &mut FreeMap,
    inode: &mut Inode,
    data: &[u8],
    offset: usize,
) -> Result<usize> {
    let mut pointers = Block::zeroed();
    let mut pointers_loaded = false;
    let mut pointers_dirty = false;
    let mut scratch = Block::zeroed();

    let total = data.len();
    let mut written = 0;
    while written < total {
        let at = offset + written;
        let target = match slot_for(at / BLOCK_SIZE) {
            Slot::Direct(k) => {
                if inode.direct[k] == 0 {
                    let Some(grant) = free.first_free() else {
                        break;
                    };
                    free.mark_used(grant);
                    inode.direct[k] = grant as u32;
                }
                inode.direct[k]
            }
            Slot::Indirect(k) => {
                if inode.indirect == 0 {
                    let Some(grant) = free.first_free() else {
                        break;
                    };
                    free.mark_used(grant);
                    inode.indirect = grant as u32;
                    // A fresh pointer block must read as all "no block here".
                    disk.write(grant, Block::zeroed().as_bytes())?;
                    pointers = Block::zeroed();
                    pointers_loaded = true;
                }
                if !pointers_loaded {
                    disk.read(inode.indirect as usize, pointers.as_bytes_mut())?;
                    pointers_loaded = true;
                }
                if pointers.pointer(k) == 0 {
                    let Some(grant) = free.first_free() else {
                        break;
                    };
                    free.mark_used(grant);
                    pointers.put_pointer(k, grant as u32);
                    pointers_dirty = true;
                }
                pointers.pointer(k)
            }
            Slot::OutOfRange => break,
        };

        // Freed blocks are never zeroed, so splice into whatever is there.
        disk.read(target as usize, scratch.as_bytes_mut())?;
        let r = at % BLOCK_SIZE;
        let chunk = (BLOCK_SIZE - r).min(total - written);
        scratch.as_bytes_mut()[r..r + chunk].copy_from_slice(&data[written..written + chunk]);
        disk.write(target as usize, scratch.as_bytes())?;
        written += chunk;
    }

    if written < total {
        debug!(written, requested = total, "write stopped short of request");
    }
    if pointers_dirty {
        disk.write(inode.indirect as usize, pointers.as_bytes())?;
    }
    let end = offset + written;
    if written > 0 && end > inode.size as usize {
        inode.size = end as u32;
    }
    Ok(written)
}
