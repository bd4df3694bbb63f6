//! Minimal file abstraction consumed by callers that persist finalized page
//! byte strings.
//!
//! Nothing in [`page`](crate::page) touches this module: it exists so a
//! table/compaction layer built on top of `litelsm` can write and read back
//! page bytes through a real file without inventing its own I/O wrapper.
//! There is no retry logic here — `EINTR` and partial-write handling are
//! `std::fs`'s job on this platform; a caller that needs WAL-grade fsync
//! discipline builds it on top of `sync`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::LsmError;

/// A byte-addressable file: append-only writes, positional reads.
pub trait RandomAccessFile {
    /// Appends `data` to the end of the file.
    fn append(&mut self, data: &[u8]) -> Result<(), LsmError>;

    /// Flushes any buffered writes to the OS. Does not imply `sync`.
    fn flush(&mut self) -> Result<(), LsmError>;

    /// Forces previously written data to stable storage.
    fn sync(&mut self) -> Result<(), LsmError>;

    /// Reads exactly `size` bytes starting at `offset`.
    fn read_at(&self, offset: u64, size: usize) -> Result<Vec<u8>, LsmError>;
}

/// A `RandomAccessFile` backed by a POSIX-style file descriptor.
pub struct PosixFile {
    file: File,
    path: PathBuf,
}

impl PosixFile {
    /// Creates a new file at `path`, truncating it if it already exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LsmError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| LsmError::Io(format!("cannot create {}: {e}", path.display())))?;
        Ok(PosixFile { file, path })
    }

    /// Opens an existing file at `path` for reading and appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LsmError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| LsmError::Io(format!("cannot open {}: {e}", path.display())))?;
        Ok(PosixFile { file, path })
    }

    /// The path this file was opened or created at.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RandomAccessFile for PosixFile {
    fn append(&mut self, data: &[u8]) -> Result<(), LsmError> {
        self.file
            .seek(SeekFrom::End(0))
            .map_err(|e| LsmError::Io(format!("seek to end of {}: {e}", self.path.display())))?;
        self.file
            .write_all(data)
            .map_err(|e| LsmError::Io(format!("write to {}: {e}", self.path.display())))
    }

    fn flush(&mut self) -> Result<(), LsmError> {
        self.file
            .flush()
            .map_err(|e| LsmError::Io(format!("flush {}: {e}", self.path.display())))
    }

    fn sync(&mut self) -> Result<(), LsmError> {
        self.file
            .sync_all()
            .map_err(|e| LsmError::Io(format!("sync {}: {e}", self.path.display())))
    }

    fn read_at(&self, offset: u64, size: usize) -> Result<Vec<u8>, LsmError> {
        let mut file = self
            .file
            .try_clone()
            .map_err(|e| LsmError::Io(format!("clone handle for {}: {e}", self.path.display())))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| LsmError::Io(format!("seek to {offset} in {}: {e}", self.path.display())))?;
        let mut buf = vec![0u8; size];
        file.read_exact(&mut buf)
            .map_err(|e| LsmError::Io(format!("read {size} bytes at {offset} in {}: {e}", self.path.display())))?;
        Ok(buf)
    }
}
