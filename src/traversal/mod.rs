//! Traversal engines and their shared result shape.
//!
//! - `sequential`: FIFO-queue BFS over adjacency lists, producing distances and parents
//! - `level_sync`: one frontier-kernel dispatch per level on a compute backend,
//!   producing distances only
//!
//! Shortest-hop distances are unique, so both engines must agree on every distance.
//! Parent trees may differ when several shortest paths exist.

pub mod level_sync;
pub mod result;
pub mod sequential;

pub use level_sync::{gpu_traverse, DriverState, LevelSyncDriver, LevelSyncReport};
pub use result::{normalize_distances, BfsResult, TraversalStats};
pub use sequential::{cpu_traverse, SequentialBfs};
