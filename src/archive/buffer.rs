//! Shared, immutable input buffer.
//!
//! A decode owns exactly one buffer. Cursors and chunks hold a cheap clone
//! of it plus their own byte range, so slicing never copies file data.

use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

use crate::util::{Error, Result};

/// Reference-counted input bytes, either owned or memory-mapped.
#[derive(Clone)]
pub struct Buffer {
    inner: Arc<Storage>,
}

enum Storage {
    /// Bytes owned in memory (decompressed payloads, caller-supplied data)
    Memory(Vec<u8>),
    /// Memory-mapped file
    #[cfg(feature = "mmap")]
    Mmap(Mmap),
}

impl Buffer {
    /// Open a file, memory-mapping it when the `mmap` feature is enabled.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        if size == 0 {
            return Err(Error::UnexpectedEof { pos: 0, wanted: 1, available: 0 });
        }

        Self::from_file(file)
    }

    #[cfg(feature = "mmap")]
    fn from_file(file: File) -> Result<Self> {
        // Safety: the file is opened read-only and the map is never written through
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
        Ok(Self { inner: Arc::new(Storage::Mmap(mmap)) })
    }

    #[cfg(not(feature = "mmap"))]
    fn from_file(mut file: File) -> Result<Self> {
        use std::io::Read;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data.into())
    }

    /// Total length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Check if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the buffer is backed by a memory map.
    pub fn is_mapped(&self) -> bool {
        match &*self.inner {
            Storage::Memory(_) => false,
            #[cfg(feature = "mmap")]
            Storage::Mmap(_) => true,
        }
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        match &*self.inner {
            Storage::Memory(v) => v.as_slice(),
            #[cfg(feature = "mmap")]
            Storage::Mmap(m) => &m[..],
        }
    }
}

impl Deref for Buffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self { inner: Arc::new(Storage::Memory(data)) }
    }
}

impl From<&[u8]> for Buffer {
    fn from(data: &[u8]) -> Self {
        data.to_vec().into()
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
