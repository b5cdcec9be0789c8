//! Transient local buffers for fetched objects
//!
//! A fetched object is spooled into a named temp file before it is merged.
//! Buffers are registered with the invocation's [`Reaper`], which owns them
//! until [`Reaper::reap`] deletes every one. Dropping a reaper without reaping
//! still removes the files.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A temp file holding one object's bytes
#[derive(Debug)]
pub struct TransientBuffer {
    file: NamedTempFile,
    len: usize,
}

impl TransientBuffer {
    /// Spool `bytes` into a new temp file
    pub fn spool(bytes: &[u8]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("profile-rollup-")
            .suffix(".json")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self {
            file,
            len: bytes.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the whole buffer back
    pub fn contents(&mut self) -> io::Result<Vec<u8>> {
        let file = self.file.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::with_capacity(self.len);
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Delete the temp file
    pub fn release(self) -> io::Result<()> {
        self.file.close()
    }
}

/// Handle to a buffer owned by a [`Reaper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferId(usize);

/// What one [`Reaper::reap`] released
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reaped {
    pub released: Vec<PathBuf>,
    /// `path: error` for each buffer that could not be removed
    pub failures: Vec<String>,
}

impl Reaped {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Owns every transient buffer created during one invocation
#[derive(Debug, Default)]
pub struct Reaper {
    buffers: Vec<Option<TransientBuffer>>,
}

impl Reaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `buffer` until the reaper runs
    pub fn register(&mut self, buffer: TransientBuffer) -> BufferId {
        self.buffers.push(Some(buffer));
        BufferId(self.buffers.len() - 1)
    }

    /// Spool `bytes` into a new buffer and register it
    pub fn spool(&mut self, bytes: &[u8]) -> io::Result<BufferId> {
        let buffer = TransientBuffer::spool(bytes)?;
        Ok(self.register(buffer))
    }

    /// Read the buffer behind `id`
    pub fn contents(&mut self, id: BufferId) -> io::Result<Vec<u8>> {
        match self.buffers.get_mut(id.0).and_then(Option::as_mut) {
            Some(buffer) => buffer.contents(),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("transient buffer {} already released", id.0),
            )),
        }
    }

    /// Buffers still held
    pub fn live(&self) -> usize {
        self.buffers.iter().filter(|b| b.is_some()).count()
    }

    /// Paths of buffers still held
    pub fn paths(&self) -> Vec<PathBuf> {
        self.buffers
            .iter()
            .flatten()
            .map(|b| b.path().to_path_buf())
            .collect()
    }

    /// Release every buffer
    ///
    /// Attempts all of them even when one fails, so the result lists both the
    /// removed paths and the failures. Reaping with nothing registered is a
    /// no-op.
    pub fn reap(&mut self) -> Reaped {
        let mut reaped = Reaped::default();
        for buffer in self.buffers.iter_mut().filter_map(Option::take) {
            let path = buffer.path().to_path_buf();
            match buffer.release() {
                Ok(()) => reaped.released.push(path),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove transient buffer");
                    reaped.failures.push(format!("{}: {e}", path.display()));
                }
            }
        }
        reaped
    }
}
