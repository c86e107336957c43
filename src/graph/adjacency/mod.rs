//! A growable adjacency-list directed graph.
//!
//! This is the mutable store both traversal engines read from:
//! - adjacency lists keep insertion order, duplicates and self-loops
//! - edges with an endpoint outside `[0, vertex_count)` are dropped silently
//! - [`Graph::to_csr`] produces a fresh CSR snapshot for data-parallel traversal

use serde::{Deserialize, Serialize};

use crate::{error::BfsError, graph::csr::CsrGraph};

/// Largest vertex count a [`Graph`] accepts.
///
/// Vertex ids must fit the `i32` result arrays (which reserve `-1`) and the
/// 32-bit device words (which reserve `u32::MAX`).
pub const MAX_VERTICES: usize = i32::MAX as usize;

/// A directed, unweighted adjacency-list graph.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `try_new` | \(O(n)\) | Allocates one empty list per vertex |
/// | `add_edge` | \(O(1)\) amortized | Appends, no dedup |
/// | `neighbors` | \(O(1)\) | Borrowed slice |
/// | `to_csr` | \(O(n + m)\) | Recomputed on every call |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AdjacencyLists")]
pub struct Graph {
    adjacency: Vec<Vec<usize>>,
}

/// Unchecked wire form of a [`Graph`].
#[derive(Deserialize)]
struct AdjacencyLists {
    adjacency: Vec<Vec<usize>>,
}

impl TryFrom<AdjacencyLists> for Graph {
    type Error = BfsError;

    /// Unlike [`Graph::from_adjacency`], a stored edge to a missing vertex is an error.
    fn try_from(lists: AdjacencyLists) -> Result<Self, Self::Error> {
        let vertex_count = lists.adjacency.len();
        if vertex_count > MAX_VERTICES {
            return Err(BfsError::InvalidSize { vertex_count });
        }
        if let Some(&vertex) = lists.adjacency.iter().flatten().find(|&&v| v >= vertex_count) {
            return Err(BfsError::VertexOutOfRange {
                vertex,
                vertex_count,
            });
        }
        Ok(Self {
            adjacency: lists.adjacency,
        })
    }
}

impl Graph {
    /// Creates a graph with `vertex_count` vertices and no edges.
    ///
    /// # Errors
    /// Returns [`BfsError::InvalidSize`] if `vertex_count > MAX_VERTICES`.
    pub fn try_new(vertex_count: usize) -> Result<Self, BfsError> {
        if vertex_count > MAX_VERTICES {
            return Err(BfsError::InvalidSize { vertex_count });
        }
        Ok(Self {
            adjacency: vec![Vec::new(); vertex_count],
        })
    }

    /// Builds a graph from adjacency lists.
    ///
    /// Neighbors outside `[0, adjacency.len())` are dropped, matching [`add_edge`](Self::add_edge).
    ///
    /// # Errors
    /// Returns [`BfsError::InvalidSize`] if there are more than `MAX_VERTICES` lists.
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>) -> Result<Self, BfsError> {
        let mut graph = Self::try_new(adjacency.len())?;
        for (from, nbrs) in adjacency.into_iter().enumerate() {
            for to in nbrs {
                graph.add_edge(from, to);
            }
        }
        Ok(graph)
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of stored edges, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Appends the directed edge `from -> to`.
    ///
    /// Returns `false` (and leaves the graph untouched) if either endpoint is out of range.
    pub fn add_edge(&mut self, from: usize, to: usize) -> bool {
        let n = self.vertex_count();
        if from >= n || to >= n {
            return false;
        }
        self.adjacency[from].push(to);
        true
    }

    /// Returns the out-neighbors of `vertex` in insertion order.
    ///
    /// Out-of-range vertices have no neighbors.
    #[inline]
    pub fn neighbors(&self, vertex: usize) -> &[usize] {
        self.adjacency.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Encodes the current adjacency as CSR.
    pub fn to_csr(&self) -> CsrGraph {
        CsrGraph::from_adjacency(&self.adjacency)
    }

    /// Returns [`BfsError::VertexOutOfRange`] unless `vertex` is a vertex of this graph.
    pub(crate) fn check_vertex(&self, vertex: usize) -> Result<(), BfsError> {
        if vertex < self.vertex_count() {
            Ok(())
        } else {
            Err(BfsError::VertexOutOfRange {
                vertex,
                vertex_count: self.vertex_count(),
            })
        }
    }
}

/// Creates an empty graph with `vertex_count` vertices.
///
/// # Errors
/// Returns [`BfsError::InvalidSize`] if `vertex_count > MAX_VERTICES`.
pub fn build_graph(vertex_count: usize) -> Result<Graph, BfsError> {
    Graph::try_new(vertex_count)
}

#[cfg(test)]
mod tests;
