//! Graph storage: a mutable adjacency-list store and its CSR snapshot.
//!
//! - `adjacency`: the store edges are inserted into
//! - `csr`: the flat offsets/edges encoding the data-parallel engine reads

pub mod adjacency;
pub mod csr;

pub use adjacency::{build_graph, Graph, MAX_VERTICES};
pub use csr::CsrGraph;
