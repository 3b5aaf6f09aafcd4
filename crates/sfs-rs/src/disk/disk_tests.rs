use crate::disk::Disk;
use crate::error::SfsError;
use crate::layout::BLOCK_SIZE;

use rand::RngCore;
use tempfile::NamedTempFile;

const BLOCKS: usize = 20;

fn open_temp_disk(tf: &NamedTempFile) -> Disk {
    Disk::open(tf.path(), BLOCKS).expect("open disk")
}

#[test]
fn open_creates_and_sizes_image() {
    let tf = NamedTempFile::new().expect("tmp file");
    let d = open_temp_disk(&tf);

    assert_eq!(d.blocks(), BLOCKS);
    let meta = std::fs::metadata(tf.path()).expect("metadata");
    assert_eq!(meta.len(), (BLOCKS * BLOCK_SIZE) as u64, "image must be pre-sized");
}

#[test]
fn fresh_image_reads_zero_filled() {
    let tf = NamedTempFile::new().expect("tmp file");
    let mut d = open_temp_disk(&tf);

    let mut buf = [0xAAu8; BLOCK_SIZE];
    d.read(0, &mut buf).expect("read");
    assert!(buf.iter().all(|&b| b == 0), "fresh blocks should read as zeros");
}

#[test]
fn write_then_read_round_trips() {
    let tf = NamedTempFile::new().expect("tmp file");
    let mut d = open_temp_disk(&tf);

    let mut data = [0u8; BLOCK_SIZE];
    rand::rng().fill_bytes(&mut data);
    d.write(7, &data).expect("write");

    let mut back = [0u8; BLOCK_SIZE];
    d.read(7, &mut back).expect("read");
    assert_eq!(back, data);
}

#[test]
fn counters_track_successful_operations() {
    let tf = NamedTempFile::new().expect("tmp file");
    let mut d = open_temp_disk(&tf);
    let buf = [0u8; BLOCK_SIZE];
    let mut back = [0u8; BLOCK_SIZE];

    d.write(0, &buf).expect("write");
    d.write(1, &buf).expect("write");
    d.read(0, &mut back).expect("read");
    assert_eq!(d.writes(), 2);
    assert_eq!(d.reads(), 1);

    // Rejected operations leave the counters alone.
    assert!(d.read(BLOCKS, &mut back).is_err());
    assert_eq!(d.reads(), 1);
}

#[test]
fn out_of_range_block_is_rejected() {
    let tf = NamedTempFile::new().expect("tmp file");
    let mut d = open_temp_disk(&tf);
    let buf = [0u8; BLOCK_SIZE];

    let err = d.write(BLOCKS, &buf).unwrap_err();
    match err {
        SfsError::BadBlock { block, blocks } => {
            assert_eq!(block, BLOCKS);
            assert_eq!(blocks, BLOCKS);
        }
        other => panic!("expected BadBlock, got {other}"),
    }
}

#[test]
fn reopen_preserves_written_blocks() {
    let tf = NamedTempFile::new().expect("tmp file");

    let mut data = [0u8; BLOCK_SIZE];
    rand::rng().fill_bytes(&mut data);
    {
        let mut d = open_temp_disk(&tf);
        d.write(3, &data).expect("write");
    }

    let mut d = open_temp_disk(&tf);
    let mut back = [0u8; BLOCK_SIZE];
    d.read(3, &mut back).expect("read");
    assert_eq!(back, data, "image contents must survive reopen");
    assert_eq!(d.reads(), 1, "counters restart at zero on open");
}
