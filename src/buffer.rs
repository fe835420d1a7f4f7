//! Buffers handed to sources by the streaming thread.
//!
//! A [`Buffer`] owns a fixed-capacity block of memory and a reported size.
//! Sources write into it through a scoped [`BufferMapWrite`] guard, which
//! gives direct access to the storage and is released when dropped.

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use std::io;
use std::ops::{Deref, DerefMut};

/// A block of memory with a reported size and metadata.
pub struct Buffer {
    /// Backing storage; its length is the capacity.
    data: Box<[u8]>,
    /// Number of valid bytes.
    size: usize,
    /// Whether the storage may be mapped for writing.
    writable: bool,
    /// Buffer metadata.
    metadata: Metadata,
}

impl Buffer {
    /// Allocate a zeroed, writable buffer of `capacity` bytes.
    ///
    /// The reported size starts at the full capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            size: capacity,
            writable: true,
            metadata: Metadata::default(),
        }
    }

    /// Create a read-only buffer holding a copy of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            data: bytes.into(),
            size: bytes.len(),
            writable: false,
            metadata: Metadata::default(),
        }
    }

    /// Total bytes of storage.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Reported size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if the reported size is zero.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Set the reported size.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        if size > self.data.len() {
            return Err(Error::InvalidSize {
                size,
                capacity: self.data.len(),
            });
        }
        self.size = size;
        Ok(())
    }

    /// The valid bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Whether the buffer can be mapped for writing.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Forbid further writable mappings.
    pub fn make_readonly(&mut self) {
        self.writable = false;
    }

    /// Get the buffer's metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Get mutable access to the buffer's metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Map the whole storage for writing.
    ///
    /// The mapping lasts until the returned guard is dropped.
    pub fn map_writable(&mut self) -> Result<BufferMapWrite<'_>> {
        if !self.writable {
            return Err(Error::MapFailed("buffer is read-only".into()));
        }
        tracing::trace!(capacity = self.data.len(), "buffer mapped for writing");
        Ok(BufferMapWrite {
            data: &mut self.data,
            position: 0,
        })
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.size)
            .field("capacity", &self.data.len())
            .field("writable", &self.writable)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// A writable view onto a buffer's storage.
///
/// Derefs to the whole capacity. The [`io::Write`] impl appends from the
/// start of the storage and stops at capacity.
pub struct BufferMapWrite<'a> {
    data: &'a mut [u8],
    position: usize,
}

impl BufferMapWrite<'_> {
    /// Bytes written through the [`io::Write`] impl so far.
    pub fn written(&self) -> usize {
        self.position
    }

    /// Unwritten tail of the mapping.
    pub fn remaining_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.position..]
    }

    /// Record `n` bytes written directly into [`remaining_mut`](Self::remaining_mut).
    pub fn advance(&mut self, n: usize) {
        self.position = (self.position + n).min(self.data.len());
    }
}

impl Deref for BufferMapWrite<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data
    }
}

impl DerefMut for BufferMapWrite<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.data
    }
}

impl io::Write for BufferMapWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = self.remaining_mut();
        let n = remaining.len().min(buf.len());
        remaining[..n].copy_from_slice(&buf[..n]);
        self.position += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for BufferMapWrite<'_> {
    fn drop(&mut self) {
        tracing::trace!(written = self.position, "buffer unmapped");
    }
}
