use std::path::PathBuf;

use clap::Parser;

/// Interactive shell over a SimpleFS disk image.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the disk image (created if missing).
    pub diskfile: PathBuf,

    /// Number of blocks in the disk image.
    pub nblocks: usize,
}
