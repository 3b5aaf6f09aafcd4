//! Diagnostic dump of an image's superblock and inode table.
//!
//! The line format is consumed by golden-output tests and is part of the
//! external contract; change it and the shell's `debug` command changes.

use std::io::Write;

use crate::disk::Disk;
use crate::error::Result;
use crate::layout::{Block, INODES_PER_BLOCK, POINTERS_PER_BLOCK};

pub(super) fn dump(disk: &mut Disk, out: &mut impl Write) -> Result<()> {
    let mut block = Block::zeroed();
    disk.read(0, block.as_bytes_mut())?;
    let sb = block.superblock();

    writeln!(out, "SuperBlock:")?;
    writeln!(
        out,
        "    magic number is {}",
        if sb.magic_valid() { "valid" } else { "invalid" }
    )?;
    writeln!(out, "    {} blocks", sb.blocks)?;
    writeln!(out, "    {} inode blocks", sb.inode_blocks)?;
    writeln!(out, "    {} inodes", sb.inodes)?;

    // An unformatted image can claim more table blocks than the disk holds.
    let table_blocks = (sb.inode_blocks as usize).min(disk.blocks().saturating_sub(1));
    let mut table = Block::zeroed();
    let mut pointers = Block::zeroed();
    for table_block in 1..=table_blocks {
        disk.read(table_block, table.as_bytes_mut())?;
        for slot in 0..INODES_PER_BLOCK {
            let inode = table.inode(slot);
            if !inode.valid {
                continue;
            }
            writeln!(out, "Inode {}:", (table_block - 1) * INODES_PER_BLOCK + slot)?;
            writeln!(out, "    size: {} bytes", inode.size)?;
            write!(out, "    direct blocks:")?;
            for ptr in inode.direct.iter().filter(|&&ptr| ptr != 0) {
                write!(out, " {ptr}")?;
            }
            writeln!(out)?;

            if inode.indirect != 0 {
                writeln!(out, "    indirect block: {}", inode.indirect)?;
                disk.read(inode.indirect as usize, pointers.as_bytes_mut())?;
                write!(out, "    indirect data blocks:")?;
                for index in 0..POINTERS_PER_BLOCK {
                    let ptr = pointers.pointer(index);
                    if ptr != 0 {
                        write!(out, " {ptr}")?;
                    }
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
