//! Error types for SimpleFS.
//!
//! Defines `SfsError` and a `Result<T>` alias used throughout the crate.
//! The shell maps these to its `-1`/`false` reply conventions; the library
//! itself never uses sentinel values.

use thiserror::Error;

/// Unified error type for all SimpleFS operations.
#[derive(Debug, Error)]
pub enum SfsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("block {block} out of range (disk has {blocks} blocks)")]
    BadBlock { block: usize, blocks: usize },

    #[error("disk is already mounted")]
    AlreadyMounted,

    #[error("file system is not mounted")]
    NotMounted,

    #[error("superblock rejected: {0}")]
    BadGeometry(&'static str),

    #[error("invalid inode {0}")]
    BadInode(usize),

    #[error("inode table is full")]
    InodeTableFull,
}

/// Result alias using `SfsError`.
pub type Result<T> = std::result::Result<T, SfsError>;
