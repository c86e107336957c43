//! Device-visible memory: word buffers and per-level uniform blocks.

use core::sync::atomic::Ordering;
use std::sync::Arc;

use zerocopy::{AsBytes, FromBytes};

use crate::{compute::kernel::KernelUniforms, concurrency::atomic::DeviceWord, error::BfsError};

/// A shared buffer of 32-bit device words.
///
/// Clones are handles to the same memory, like a device buffer reference bound
/// into several submissions. Reads and writes are relaxed; ordering between host
/// and kernel comes from [`Submission::wait_until_completed`](crate::compute::Submission::wait_until_completed).
#[derive(Debug, Clone)]
pub struct DeviceBuffer {
    label: &'static str,
    words: Arc<[DeviceWord]>,
}

impl DeviceBuffer {
    /// Allocates a buffer initialized from `contents`.
    ///
    /// # Errors
    /// Returns [`BfsError::BufferAllocationFailed`] if the memory cannot be reserved.
    pub fn from_slice(label: &'static str, contents: &[u32]) -> Result<Self, BfsError> {
        let mut words = Vec::new();
        words
            .try_reserve_exact(contents.len())
            .map_err(|_| BfsError::BufferAllocationFailed {
                label,
                words: contents.len(),
            })?;
        words.extend(contents.iter().map(|&w| DeviceWord::new(w)));
        Ok(Self {
            label,
            words: words.into(),
        })
    }

    /// Buffer label, used in error reports.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Length in words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the buffer holds no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Loads word `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline(always)]
    pub fn load(&self, index: usize) -> u32 {
        self.words[index].load(Ordering::Relaxed)
    }

    /// Stores word `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline(always)]
    pub fn store(&self, index: usize, value: u32) {
        self.words[index].store(value, Ordering::Relaxed);
    }

    /// Copies the buffer back to host memory.
    pub fn read_back(&self) -> Vec<u32> {
        self.words.iter().map(|w| w.load(Ordering::Relaxed)).collect()
    }
}

/// A per-level uniform block, stored as the raw bytes the kernel decodes.
#[derive(Debug, Clone)]
pub struct UniformBuffer {
    bytes: Arc<[u8]>,
}

impl UniformBuffer {
    /// Encodes `uniforms` into a new block.
    ///
    /// # Errors
    /// Returns [`BfsError::BufferAllocationFailed`] if the memory cannot be reserved.
    pub fn new(uniforms: &KernelUniforms) -> Result<Self, BfsError> {
        let src = uniforms.as_bytes();
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(src.len())
            .map_err(|_| BfsError::BufferAllocationFailed {
                label: "uniforms",
                words: src.len() / 4,
            })?;
        bytes.extend_from_slice(src);
        Ok(Self {
            bytes: bytes.into(),
        })
    }

    /// Raw contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the block, or `None` if it is not exactly one [`KernelUniforms`].
    pub fn decode(&self) -> Option<KernelUniforms> {
        KernelUniforms::read_from(&self.bytes[..])
    }
}
