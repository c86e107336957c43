use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

/// The single-word "progress made" flag of a level.
///
/// The host resets it before each dispatch and reads it once after the dispatch
/// completes; kernel threads only ever raise it. The word sits on its own cache
/// line so raising it does not contend with distance writes.
///
/// Clones share the same word.
#[derive(Debug, Clone, Default)]
pub struct ProgressFlag {
    word: Arc<CachePadded<AtomicU32>>,
}

impl ProgressFlag {
    /// Creates a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowers the flag. Host side, between levels.
    #[inline]
    pub fn reset(&self) {
        self.word.store(0, Ordering::Relaxed);
    }

    /// Raises the flag. Kernel side; any number of threads may race here.
    #[inline(always)]
    pub fn raise(&self) {
        self.word.store(1, Ordering::Relaxed);
    }

    /// Returns `true` if any thread raised the flag since the last reset.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.word.load(Ordering::Relaxed) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_from_many_threads() {
        let flag = ProgressFlag::new();
        assert!(!flag.is_raised());
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| flag.raise());
            }
        });
        assert!(flag.is_raised());
        flag.reset();
        assert!(!flag.is_raised());
    }

    #[test]
    fn clones_share_the_word() {
        let flag = ProgressFlag::new();
        let other = flag.clone();
        other.raise();
        assert!(flag.is_raised());
    }
}
