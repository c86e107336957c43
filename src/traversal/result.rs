//! Public traversal results and the device-to-host distance adapter.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{compute::UNREACHED, error::BfsError};

/// Distances and BFS-tree parents from one traversal.
///
/// Both arrays use `-1` for "unreached"; `parents[source]` is also `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBfsResult")]
pub struct BfsResult {
    source: usize,
    distances: Vec<i32>,
    parents: Vec<i32>,
}

/// Unchecked wire form of a [`BfsResult`].
#[derive(Deserialize)]
struct RawBfsResult {
    source: usize,
    distances: Vec<i32>,
    parents: Vec<i32>,
}

impl TryFrom<RawBfsResult> for BfsResult {
    type Error = BfsError;

    fn try_from(raw: RawBfsResult) -> Result<Self, Self::Error> {
        Self::from_parts(raw.source, raw.distances, raw.parents)
    }
}

/// Summary figures of a distance array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalStats {
    /// Vertices with a distance, source included.
    pub reachable: usize,
    /// Largest distance, or `-1` if nothing was reached.
    pub max_distance: i32,
}

impl TraversalStats {
    /// Computes the figures of a `-1`-sentinel distance array.
    pub fn from_distances(distances: &[i32]) -> Self {
        let reachable = distances.iter().filter(|&&d| d != -1).count();
        let max_distance = distances.iter().copied().max().unwrap_or(-1);
        Self {
            reachable,
            max_distance,
        }
    }
}

impl fmt::Display for TraversalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BFS Statistics:")?;
        writeln!(f, "- Reachable vertices: {}", self.reachable)?;
        write!(f, "- Maximum distance: {}", self.max_distance)
    }
}

impl BfsResult {
    /// Assembles a result from its parts.
    ///
    /// # Errors
    /// - [`BfsError::ShapeMismatch`] if the arrays differ in length
    /// - [`BfsError::VertexOutOfRange`] if `source` is not an index of the arrays
    pub fn from_parts(
        source: usize,
        distances: Vec<i32>,
        parents: Vec<i32>,
    ) -> Result<Self, BfsError> {
        if distances.len() != parents.len() {
            return Err(BfsError::ShapeMismatch {
                distances: distances.len(),
                parents: parents.len(),
            });
        }
        if source >= distances.len() {
            return Err(BfsError::VertexOutOfRange {
                vertex: source,
                vertex_count: distances.len(),
            });
        }
        Ok(Self {
            source,
            distances,
            parents,
        })
    }

    /// The traversal source.
    pub fn source(&self) -> usize {
        self.source
    }

    /// Hop counts from the source, `-1` where unreached.
    pub fn distances(&self) -> &[i32] {
        &self.distances
    }

    /// BFS-tree predecessors, `-1` for the source and unreached vertices.
    pub fn parents(&self) -> &[i32] {
        &self.parents
    }

    /// Hop count to `vertex`, or `None` if unreached or out of range.
    pub fn distance(&self, vertex: usize) -> Option<u32> {
        self.distances
            .get(vertex)
            .and_then(|&d| u32::try_from(d).ok())
    }

    /// Returns `true` if `vertex` was reached.
    pub fn is_reachable(&self, vertex: usize) -> bool {
        self.distance(vertex).is_some()
    }

    /// Reachable count and maximum distance.
    pub fn stats(&self) -> TraversalStats {
        TraversalStats::from_distances(&self.distances)
    }

    /// Returns the vertices on the BFS-tree path `source -> target`, both inclusive.
    ///
    /// Unreached targets yield an empty path; `path(source)` is `[source]`.
    ///
    /// # Errors
    /// - [`BfsError::VertexOutOfRange`] if `target` is not a vertex
    /// - [`BfsError::MalformedParents`] if the parent chain leaves the array, cycles,
    ///   or ends anywhere but the source
    pub fn path(&self, target: usize) -> Result<Vec<usize>, BfsError> {
        let n = self.distances.len();
        if target >= n {
            return Err(BfsError::VertexOutOfRange {
                vertex: target,
                vertex_count: n,
            });
        }
        if self.distances[target] == -1 {
            return Ok(Vec::new());
        }

        let malformed = BfsError::MalformedParents { vertex: target };
        let mut path = vec![target];
        let mut current = target;
        // A simple path has at most n vertices; anything longer is a cycle.
        while current != self.source {
            if path.len() > n {
                return Err(malformed);
            }
            let parent = self
                .parents
                .get(current)
                .and_then(|&p| usize::try_from(p).ok())
                .filter(|&p| p < n)
                .ok_or_else(|| malformed.clone())?;
            path.push(parent);
            current = parent;
        }
        path.reverse();
        Ok(path)
    }
}

/// Converts a device distance buffer to the public `-1`-for-unreached form.
pub fn normalize_distances(device: &[u32]) -> Vec<i32> {
    device
        .iter()
        .map(|&d| {
            if d == UNREACHED {
                -1
            } else {
                i32::try_from(d).unwrap_or(-1)
            }
        })
        .collect()
}
