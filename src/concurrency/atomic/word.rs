use core::sync::atomic::{AtomicU32, Ordering};

/// A 32-bit word of device memory.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct DeviceWord {
    inner: AtomicU32,
}

impl DeviceWord {
    /// Creates a new word.
    #[inline(always)]
    pub const fn new(value: u32) -> Self {
        Self {
            inner: AtomicU32::new(value),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> u32 {
        self.inner.load(order)
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: u32, order: Ordering) {
        self.inner.store(value, order);
    }
}
