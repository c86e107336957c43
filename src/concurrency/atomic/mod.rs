//! Relaxed atomic words backing device-visible memory.
//!
//! Kernel threads race on these words within a level. Every racing write stores
//! the same value, so plain relaxed loads and stores are enough; the level
//! barrier (joining the dispatch) publishes them to the host.
//!
//! Important:
//! - No read-modify-write is needed for distances. Only the progress flag is
//!   ever set by many threads, and only "zero vs non-zero" is inspected.

/// 32-bit device word.
pub mod word;
/// Cache-padded progress flag.
pub mod flag;

pub use flag::ProgressFlag;
pub use word::DeviceWord;
