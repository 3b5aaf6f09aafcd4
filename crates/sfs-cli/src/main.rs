#![allow(clippy::multiple_crate_versions)]

mod cli;
mod shell;
mod transfer;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sfs_rs::disk::Disk;
use sfs_rs::fs::FileSystem;

use cli::Cli;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let disk = Disk::open(&cli.diskfile, cli.nblocks)
        .with_context(|| format!("unable to open disk image {}", cli.diskfile.display()))?;
    let fs = FileSystem::new(disk);

    let stdin = io::stdin();
    shell::run(fs, &mut stdin.lock(), &mut io::stdout())
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();
}
