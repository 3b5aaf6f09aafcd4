use super::{INODE_SIZE, INODES_PER_BLOCK, POINTERS_PER_INODE};

/// One file: a valid flag, its size in bytes, five direct block numbers,
/// and one indirect block number. Zero means "no block here" for every
/// pointer field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inode {
    pub valid: bool,
    pub size: u32,
    pub direct: [u32; POINTERS_PER_INODE],
    pub indirect: u32,
}

impl Inode {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            valid: false,
            size: 0,
            direct: [0; POINTERS_PER_INODE],
            indirect: 0,
        }
    }

    /// Inode number `n` lives in this inode-table block, at this slot.
    #[must_use]
    pub const fn location(inode_number: usize) -> (usize, usize) {
        (
            1 + inode_number / INODES_PER_BLOCK,
            inode_number % INODES_PER_BLOCK,
        )
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; INODE_SIZE] {
        let mut buf = [0u8; INODE_SIZE];
        buf[0..4].copy_from_slice(&u32::from(self.valid).to_le_bytes());
        buf[4..8].copy_from_slice(&self.size.to_le_bytes());
        for (k, ptr) in self.direct.iter().enumerate() {
            let at = 8 + k * 4;
            buf[at..at + 4].copy_from_slice(&ptr.to_le_bytes());
        }
        buf[28..32].copy_from_slice(&self.indirect.to_le_bytes());
        buf
    }

    /// # Panics
    /// Panics if `buf` does not contain a full inode payload.
    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Self {
        let mut direct = [0u32; POINTERS_PER_INODE];
        for (k, ptr) in direct.iter_mut().enumerate() {
            let at = 8 + k * 4;
            *ptr = u32::from_le_bytes(buf[at..at + 4].try_into().unwrap());
        }
        Self {
            valid: u32::from_le_bytes(buf[0..4].try_into().unwrap()) != 0,
            size: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            direct,
            indirect: u32::from_le_bytes(buf[28..32].try_into().unwrap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inode_round_trips() {
        let inode = Inode {
            valid: true,
            size: 27160,
            direct: [4, 5, 6, 7, 8],
            indirect: 9,
        };
        assert_eq!(Inode::from_bytes(&inode.to_bytes()), inode);
    }

    #[test]
    fn empty_inode_encodes_to_zeros() {
        assert_eq!(Inode::empty().to_bytes(), [0u8; INODE_SIZE]);
    }

    #[test]
    fn nonzero_valid_word_decodes_as_valid() {
        let mut bytes = Inode::empty().to_bytes();
        bytes[0..4].copy_from_slice(&7u32.to_le_bytes());
        assert!(Inode::from_bytes(&bytes).valid);
    }

    #[test]
    fn location_splits_table_block_and_slot() {
        assert_eq!(Inode::location(0), (1, 0));
        assert_eq!(Inode::location(127), (1, 127));
        assert_eq!(Inode::location(128), (2, 0));
        assert_eq!(Inode::location(300), (3, 44));
    }
}
