//! # `frontier-bfs` - Level-Synchronous Parallel BFS
//!
//! Single-source shortest-hop distances over unweighted directed graphs, computed
//! by a data-parallel frontier kernel and cross-checked against a sequential
//! queue-based BFS.
//!
//! ## Architecture
//!
//! 1. **Graph store** ([`Graph`]): adjacency lists; edges with an out-of-range
//!    endpoint are dropped, duplicates and self-loops are kept.
//! 2. **CSR encoding** ([`CsrGraph`]): `offsets` + flat `edges`, rebuilt before every
//!    parallel traversal.
//! 3. **Sequential engine** ([`SequentialBfs`]): the oracle; fills distances and parents.
//! 4. **Frontier kernel** ([`compute::kernel`]): one invocation per vertex per level.
//!    A frontier vertex at level `L` stores `L + 1` into every unreached neighbor and
//!    raises a shared progress flag.
//! 5. **Level-synchronous driver** ([`LevelSyncDriver`]): dispatches the kernel once
//!    per level, blocks until the dispatch completes, and stops when no thread made
//!    progress (or after `vertex_count` levels).
//! 6. **Result adapter** ([`BfsResult`]): `-1`-for-unreached arrays and path
//!    reconstruction.
//!
//! ### Concurrency Model
//!
//! Within a level, many threads may store into the same distance word. They all
//! store the same value (`L + 1`), so the race is benign: distance words are
//! relaxed atomics written with plain stores, never compare-and-swap. The only
//! ordering requirement is the level barrier, provided by waiting on each
//! [`compute::Submission`] before the host touches the progress flag.
//!
//! Backends sit behind [`compute::ComputeBackend`]; the driver never sees how
//! thread-groups are scheduled.
//!
//! ## Example
//!
//! ```rust
//! use frontier_bfs::{build_graph, cpu_traverse, compute::SerialBackend, LevelSyncDriver};
//!
//! let mut graph = build_graph(4).unwrap();
//! graph.add_edge(0, 1);
//! graph.add_edge(1, 2);
//! graph.add_edge(0, 2);
//!
//! let oracle = cpu_traverse(&graph, 0).unwrap();
//! assert_eq!(oracle.distances(), &[0, 1, 1, -1]);
//! assert_eq!(oracle.path(2).unwrap(), vec![0, 2]);
//!
//! let driver = LevelSyncDriver::new(SerialBackend::default()).unwrap();
//! assert_eq!(driver.traverse(&graph, 0).unwrap(), oracle.distances());
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod compute;
pub mod concurrency;
pub mod error;
pub mod graph;
pub mod traversal;

pub use compute::{default_backend, BackendConfig, ComputeBackend};
pub use error::{BfsError, ErrorKind};
pub use graph::{build_graph, CsrGraph, Graph, MAX_VERTICES};
pub use traversal::{
    cpu_traverse, gpu_traverse, BfsResult, DriverState, LevelSyncDriver, LevelSyncReport,
    SequentialBfs, TraversalStats,
};
