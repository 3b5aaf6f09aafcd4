//! The interactive command loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::info;

use sfs_rs::fs::FileSystem;

use crate::transfer::{copy_in, copy_out};

/// Runs the command loop until `quit`/`exit` or end of input, then unmounts.
///
/// # Errors
/// Fails only when `input` or `out` breaks; file-system failures are
/// reported as command replies and the loop continues.
pub fn run(mut fs: FileSystem, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
    let mut line = String::new();
    loop {
        eprint!("sfs> ");
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            continue;
        };
        let arg1 = words.next();
        let arg2 = words.next();

        match (cmd, arg1, arg2) {
            ("debug", None, None) => fs.debug(out)?,
            ("debug", ..) => writeln!(out, "Usage: debug")?,

            ("format", None, None) => {
                if fs.format().is_ok() {
                    writeln!(out, "disk formatted.")?;
                } else {
                    writeln!(out, "format failed!")?;
                }
            }
            ("format", ..) => writeln!(out, "Usage: format")?,

            ("mount", None, None) => {
                if fs.mount().is_ok() {
                    writeln!(out, "disk mounted.")?;
                } else {
                    writeln!(out, "mount failed!")?;
                }
            }
            ("mount", ..) => writeln!(out, "Usage: mount")?,

            ("create", None, None) => match fs.create() {
                Ok(inode) => writeln!(out, "created inode {inode}.")?,
                Err(_) => writeln!(out, "create failed!")?,
            },
            ("create", ..) => writeln!(out, "Usage: create")?,

            ("remove", Some(arg), None) => do_remove(&mut fs, out, arg)?,
            ("remove", ..) => writeln!(out, "Usage: remove <inode>")?,

            ("stat", Some(arg), None) => do_stat(&mut fs, out, arg)?,
            ("stat", ..) => writeln!(out, "Usage: stat <inode>")?,

            ("cat", Some(arg), None) => do_cat(&mut fs, out, arg)?,
            ("cat", ..) => writeln!(out, "Usage: cat <inode>")?,

            ("copyin", Some(path), Some(arg)) => do_copyin(&mut fs, out, path, arg)?,
            ("copyin", ..) => writeln!(out, "Usage: copyin <file> <inode>")?,

            ("copyout", Some(arg), Some(path)) => do_copyout(&mut fs, out, arg, path)?,
            ("copyout", ..) => writeln!(out, "Usage: copyout <inode> <file>")?,

            ("help", ..) => print_help(out)?,
            ("quit" | "exit", ..) => break,

            _ => {
                write!(out, "Unknown command: {line}")?;
                writeln!(out, "Type 'help' for a list of commands.")?;
            }
        }
    }

    fs.unmount();
    info!(
        disk = %fs.disk().path().display(),
        reads = fs.disk().reads(),
        writes = fs.disk().writes(),
        "disk counters at exit"
    );
    Ok(())
}

fn do_remove(fs: &mut FileSystem, out: &mut impl Write, arg: &str) -> Result<()> {
    let removed = arg
        .parse::<usize>()
        .is_ok_and(|inode| fs.remove(inode).is_ok());
    if removed {
        writeln!(out, "removed inode {arg}.")?;
    } else {
        writeln!(out, "remove failed!")?;
    }
    Ok(())
}

fn do_stat(fs: &mut FileSystem, out: &mut impl Write, arg: &str) -> Result<()> {
    let size = arg.parse::<usize>().ok().and_then(|inode| fs.stat(inode).ok());
    match size {
        Some(size) => writeln!(out, "inode {arg} has size {size} bytes.")?,
        None => writeln!(out, "stat failed!")?,
    }
    Ok(())
}

fn do_cat(fs: &mut FileSystem, out: &mut impl Write, arg: &str) -> Result<()> {
    let Ok(inode) = arg.parse::<usize>() else {
        writeln!(out, "cat failed!")?;
        return Ok(());
    };
    match copy_out(fs, inode, out) {
        Ok(copied) => writeln!(out, "{copied} bytes copied")?,
        Err(_) => writeln!(out, "cat failed!")?,
    }
    Ok(())
}

fn do_copyin(fs: &mut FileSystem, out: &mut impl Write, path: &str, arg: &str) -> Result<()> {
    let Ok(inode) = arg.parse::<usize>() else {
        writeln!(out, "copyin failed!")?;
        return Ok(());
    };
    match copy_in(fs, std::path::Path::new(path), inode) {
        Ok(copied) => writeln!(out, "{copied} bytes copied")?,
        Err(_) => writeln!(out, "copyin failed!")?,
    }
    Ok(())
}

fn do_copyout(fs: &mut FileSystem, out: &mut impl Write, arg: &str, path: &str) -> Result<()> {
    let Ok(inode) = arg.parse::<usize>() else {
        writeln!(out, "copyout failed!")?;
        return Ok(());
    };
    let Ok(mut file) = std::fs::File::create(path) else {
        writeln!(out, "copyout failed!")?;
        return Ok(());
    };
    match copy_out(fs, inode, &mut file) {
        Ok(copied) => writeln!(out, "{copied} bytes copied")?,
        Err(_) => writeln!(out, "copyout failed!")?,
    }
    Ok(())
}

fn print_help(out: &mut impl Write) -> Result<()> {
    writeln!(out, "Commands are:")?;
    writeln!(out, "    format")?;
    writeln!(out, "    mount")?;
    writeln!(out, "    debug")?;
    writeln!(out, "    create")?;
    writeln!(out, "    remove  <inode>")?;
    writeln!(out, "    cat     <inode>")?;
    writeln!(out, "    stat    <inode>")?;
    writeln!(out, "    copyin  <file> <inode>")?;
    writeln!(out, "    copyout <inode> <file>")?;
    writeln!(out, "    help")?;
    writeln!(out, "    quit")?;
    writeln!(out, "    exit")?;
    Ok(())
}
