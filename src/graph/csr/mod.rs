//! A compact CSR (compressed sparse row) snapshot of a [`Graph`](crate::Graph).
//!
//! Memory layout:
//! - `offsets`: `Vec<usize>` of length `n + 1`, `offsets[n] == edges.len()`
//! - `edges`: neighbor ids, the adjacency lists concatenated in vertex order
//!
//! `edges[offsets[v]..offsets[v + 1]]` is exactly the adjacency list of `v`,
//! duplicates and self-loops included.

use serde::{Deserialize, Serialize};

use crate::error::BfsError;

/// Read-only CSR encoding of a directed graph.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `from_adjacency` | \(O(n + m)\) | Prefix sum over list lengths |
/// | `neighbors` | \(O(1)\) | Borrowed slice of `edges` |
/// | `degree` | \(O(1)\) | Offset difference |
/// | `device_words` | \(O(n + m)\) | Narrows to 32-bit device words |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CsrParts")]
pub struct CsrGraph {
    offsets: Vec<usize>,
    edges: Vec<usize>,
}

/// Unchecked wire form of a [`CsrGraph`].
#[derive(Deserialize)]
struct CsrParts {
    offsets: Vec<usize>,
    edges: Vec<usize>,
}

impl TryFrom<CsrParts> for CsrGraph {
    type Error = BfsError;

    fn try_from(parts: CsrParts) -> Result<Self, Self::Error> {
        Self::try_from_parts(parts.offsets, parts.edges)
    }
}

impl CsrGraph {
    /// Builds a CSR graph from adjacency lists.
    ///
    /// # Panics
    ///
    /// Panics if any edge references a node index out of bounds.
    pub fn from_adjacency(adjacency: &[Vec<usize>]) -> Self {
        let n = adjacency.len();

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);

        let mut total_edges = 0usize;
        for nbrs in adjacency {
            total_edges = total_edges.saturating_add(nbrs.len());
            offsets.push(total_edges);
        }

        let mut edges = Vec::with_capacity(total_edges);
        for (u, nbrs) in adjacency.iter().enumerate() {
            for &v in nbrs {
                assert!(v < n, "edge {u}->{v} is out of bounds for n={n}");
                edges.push(v);
            }
        }

        Self { offsets, edges }
    }

    /// Builds a CSR graph directly from CSR parts.
    ///
    /// # Panics
    /// Panics wherever [`try_from_parts`](Self::try_from_parts) would return an error.
    pub fn from_csr_parts(offsets: Vec<usize>, edges: Vec<usize>) -> Self {
        match Self::try_from_parts(offsets, edges) {
            Ok(csr) => csr,
            Err(e) => panic!("{e}"),
        }
    }

    /// Builds a CSR graph from untrusted parts.
    ///
    /// # Errors
    /// - [`BfsError::MalformedCsr`] if `offsets` is empty, does not start at 0,
    ///   is not monotone, or does not end at `edges.len()`
    /// - [`BfsError::VertexOutOfRange`] if an edge targets a vertex `>= offsets.len() - 1`
    pub fn try_from_parts(offsets: Vec<usize>, edges: Vec<usize>) -> Result<Self, BfsError> {
        let malformed = |reason| Err(BfsError::MalformedCsr { reason });
        let Some(n) = offsets.len().checked_sub(1) else {
            return malformed("offsets must have length n+1");
        };
        if offsets[0] != 0 {
            return malformed("offsets must start at 0");
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return malformed("offsets must be monotone");
        }
        if offsets[n] != edges.len() {
            return malformed("offsets last must equal edges length");
        }
        if let Some(&vertex) = edges.iter().find(|&&v| v >= n) {
            return Err(BfsError::VertexOutOfRange {
                vertex,
                vertex_count: n,
            });
        }
        Ok(Self { offsets, edges })
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Row offsets, `node_count() + 1` entries.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Concatenated neighbor ids.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    /// Returns the out-neighbors of `node`.
    ///
    /// # Panics
    /// Panics if `node` is out of bounds.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        assert!(node < self.node_count(), "node {node} out of bounds");
        &self.edges[self.offsets[node]..self.offsets[node + 1]]
    }

    /// Returns the out-degree of a node.
    ///
    /// # Panics
    /// Panics if `node` is out of bounds.
    pub fn degree(&self, node: usize) -> usize {
        assert!(node < self.node_count(), "node {node} out of bounds");
        self.offsets[node + 1] - self.offsets[node]
    }

    /// Narrows `(offsets, edges)` to the 32-bit words device buffers hold.
    ///
    /// # Errors
    /// Returns [`BfsError::BufferAllocationFailed`] if an offset does not fit in a `u32`
    /// (too many edges for a 32-bit device).
    pub fn device_words(&self) -> Result<(Vec<u32>, Vec<u32>), BfsError> {
        let offsets = narrow("offsets", &self.offsets)?;
        // Every edge target is < node_count <= MAX_VERTICES once offsets fit.
        let edges = narrow("edges", &self.edges)?;
        Ok((offsets, edges))
    }
}

fn narrow(label: &'static str, values: &[usize]) -> Result<Vec<u32>, BfsError> {
    values
        .iter()
        .map(|&v| u32::try_from(v))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| BfsError::BufferAllocationFailed {
            label,
            words: values.len(),
        })
}
