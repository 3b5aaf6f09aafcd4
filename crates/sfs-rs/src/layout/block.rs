use super::super_block::SUPER_SIZE;
use super::{BLOCK_SIZE, INODE_SIZE, INODES_PER_BLOCK, Inode, POINTERS_PER_BLOCK, SuperBlock};

/// A single fixed-size block buffer.
///
/// One buffer serves as superblock, inode array, pointer array, or raw
/// bytes. Each view is an explicit decode from (or encode into) the bytes,
/// which keeps the format endian-explicit and free of aliasing tricks.
#[derive(Clone)]
pub struct Block([u8; BLOCK_SIZE]);

impl Block {
    #[must_use]
    pub const fn zeroed() -> Self {
        Self([0u8; BLOCK_SIZE])
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }

    #[inline]
    pub const fn as_bytes_mut(&mut self) -> &mut [u8; BLOCK_SIZE] {
        &mut self.0
    }

    /// View the front of the block as a superblock.
    #[must_use]
    pub fn superblock(&self) -> SuperBlock {
        SuperBlock::from_bytes(&self.0[..SUPER_SIZE])
    }

    pub fn put_superblock(&mut self, sb: &SuperBlock) {
        self.0[..SUPER_SIZE].copy_from_slice(&sb.to_bytes());
    }

    /// View inode-table slot `slot` of this block.
    ///
    /// # Panics
    /// Panics if `slot >= INODES_PER_BLOCK`.
    #[must_use]
    pub fn inode(&self, slot: usize) -> Inode {
        assert!(slot < INODES_PER_BLOCK);
        let at = slot * INODE_SIZE;
        Inode::from_bytes(&self.0[at..at + INODE_SIZE])
    }

    /// # Panics
    /// Panics if `slot >= INODES_PER_BLOCK`.
    pub fn put_inode(&mut self, slot: usize, inode: &Inode) {
        assert!(slot < INODES_PER_BLOCK);
        let at = slot * INODE_SIZE;
        self.0[at..at + INODE_SIZE].copy_from_slice(&inode.to_bytes());
    }

    /// View entry `index` of an indirect pointer block.
    ///
    /// # Panics
    /// Panics if `index >= POINTERS_PER_BLOCK`.
    #[must_use]
    pub fn pointer(&self, index: usize) -> u32 {
        assert!(index < POINTERS_PER_BLOCK);
        let at = index * 4;
        u32::from_le_bytes(self.0[at..at + 4].try_into().unwrap())
    }

    /// # Panics
    /// Panics if `index >= POINTERS_PER_BLOCK`.
    pub fn put_pointer(&mut self, index: usize, block: u32) {
        assert!(index < POINTERS_PER_BLOCK);
        let at = index * 4;
        self.0[at..at + 4].copy_from_slice(&block.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{MAGIC_NUMBER, geometry};

    #[test]
    fn superblock_view_round_trips() {
        let mut block = Block::zeroed();
        block.put_superblock(&SuperBlock::for_geometry(&geometry(5)));
        let sb = block.superblock();
        assert_eq!(sb.magic_number, MAGIC_NUMBER);
        assert_eq!(sb.blocks, 5);
    }

    #[test]
    fn inode_slots_do_not_overlap() {
        let mut block = Block::zeroed();
        let a = Inode {
            valid: true,
            size: 10,
            direct: [2, 0, 0, 0, 0],
            indirect: 0,
        };
        let b = Inode {
            valid: true,
            size: 20,
            direct: [3, 4, 0, 0, 0],
            indirect: 9,
        };
        block.put_inode(0, &a);
        block.put_inode(INODES_PER_BLOCK - 1, &b);
        assert_eq!(block.inode(0), a);
        assert_eq!(block.inode(INODES_PER_BLOCK - 1), b);
        assert_eq!(block.inode(1), Inode::empty());
    }

    #[test]
    fn pointer_view_covers_whole_block() {
        let mut block = Block::zeroed();
        block.put_pointer(0, 13);
        block.put_pointer(POINTERS_PER_BLOCK - 1, 14);
        assert_eq!(block.pointer(0), 13);
        assert_eq!(block.pointer(POINTERS_PER_BLOCK - 1), 14);
        assert_eq!(block.pointer(1), 0);
    }

    #[test]
    #[should_panic(expected = "slot < INODES_PER_BLOCK")]
    fn inode_slot_out_of_range_panics() {
        let block = Block::zeroed();
        let _ = block.inode(INODES_PER_BLOCK);
    }
}
