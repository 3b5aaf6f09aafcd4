//! Streaming import/export between host files and SimpleFS inodes.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use sfs_rs::fs::FileSystem;

/// Transfer chunk for streaming copies: four 8 KiB stdio buffers.
pub const COPY_CHUNK: usize = 4 * 8192;

/// Streams the host file at `path` into `inode` with repeated writes at
/// increasing offsets, stopping at a short write (image out of space).
/// Returns the bytes stored.
///
/// # Errors
/// Fails only when the host file cannot be opened or read; file-system
/// trouble mid-copy ends the stream with the bytes stored so far.
pub fn copy_in(fs: &mut FileSystem, path: &Path, inode: usize) -> Result<usize> {
    let mut stream =
        File::open(path).with_context(|| format!("unable to open {}", path.display()))?;

    let mut buffer = vec![0u8; COPY_CHUNK];
    let mut offset = 0;
    loop {
        let got = stream.read(&mut buffer)?;
        if got == 0 {
            break;
        }
        let stored = match fs.write(inode, &buffer[..got], offset) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(%err, inode, offset, "write failed during copyin");
                break;
            }
        };
        offset += stored;
        if stored != got {
            warn!(stored, requested = got, inode, "image full during copyin");
            break;
        }
    }
    Ok(offset)
}

/// Streams `inode` into `out` with repeated reads until one returns zero.
/// Returns the bytes copied.
///
/// # Errors
/// Fails when the inode is invalid or `out` cannot be written.
pub fn copy_out(fs: &mut FileSystem, inode: usize, out: &mut impl Write) -> Result<usize> {
    let mut buffer = vec![0u8; COPY_CHUNK];
    let mut offset = 0;
    loop {
        let got = fs.read(inode, &mut buffer, offset)?;
        if got == 0 {
            break;
        }
        out.write_all(&buffer[..got])?;
        offset += got;
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::RngCore;
    use sfs_rs::disk::Disk;
    use tempfile::NamedTempFile;

    fn mounted_fs(blocks: usize) -> (NamedTempFile, FileSystem) {
        let tf = NamedTempFile::new().expect("tmp image");
        let disk = Disk::open(tf.path(), blocks).expect("open disk");
        let mut fs = FileSystem::new(disk);
        fs.format().expect("format");
        fs.mount().expect("mount");
        (tf, fs)
    }

    #[test]
    fn copyin_then_copyout_round_trips() {
        let (_tf, mut fs) = mounted_fs(20);
        let inode = fs.create().expect("create");

        // Larger than one chunk and not block-aligned.
        let mut payload = vec![0u8; COPY_CHUNK + 12345];
        rand::rng().fill_bytes(&mut payload);
        let host = NamedTempFile::new().expect("tmp payload");
        std::fs::write(host.path(), &payload).expect("write payload");

        let stored = copy_in(&mut fs, host.path(), inode).expect("copyin");
        assert_eq!(stored, payload.len());
        assert_eq!(fs.stat(inode).expect("stat"), payload.len() as u32);

        let mut back = Vec::new();
        let copied = copy_out(&mut fs, inode, &mut back).expect("copyout");
        assert_eq!(copied, payload.len());
        assert_eq!(back, payload);
    }

    #[test]
    fn copyin_stops_at_a_full_image() {
        // 3 data blocks available on a 5-block image.
        let (_tf, mut fs) = mounted_fs(5);
        let inode = fs.create().expect("create");

        let payload = vec![0x5Au8; 5 * 4096];
        let host = NamedTempFile::new().expect("tmp payload");
        std::fs::write(host.path(), &payload).expect("write payload");

        let stored = copy_in(&mut fs, host.path(), inode).expect("copyin");
        assert_eq!(stored, 3 * 4096);
    }

    #[test]
    fn copyout_of_an_invalid_inode_fails() {
        let (_tf, mut fs) = mounted_fs(5);
        let mut sink = Vec::new();
        assert!(copy_out(&mut fs, 7, &mut sink).is_err());
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_host_file_fails_copyin() {
        let (_tf, mut fs) = mounted_fs(5);
        let inode = fs.create().expect("create");
        assert!(copy_in(&mut fs, Path::new("/no/such/file"), inode).is_err());
    }
}
