//! Core SimpleFS primitives used by the `sfssh` shell.
//!
//! A SimpleFS image is a sequence of fixed-size blocks: a superblock, an
//! inode table, and a data region. This crate provides the block-addressed
//! [`disk::Disk`], the on-disk codecs in [`layout`], and the mounted
//! [`fs::FileSystem`] with its inode-level operations.

pub mod disk;
pub mod error;
pub mod fs;
pub mod layout;

pub use error::{Result, SfsError};
