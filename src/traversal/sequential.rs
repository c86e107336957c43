//! Queue-based sequential BFS, the reference the parallel driver is checked against.

use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::{error::BfsError, graph::Graph, traversal::result::BfsResult};

/// Single-threaded BFS over the adjacency lists of a [`Graph`].
#[derive(Debug, Clone, Copy)]
pub struct SequentialBfs<'g> {
    graph: &'g Graph,
}

impl<'g> SequentialBfs<'g> {
    /// Borrows `graph` for traversal.
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Runs BFS from `source`, filling distances and parents.
    ///
    /// Every neighbor is relaxed at most once (guarded by its `-1` distance), so the
    /// parent of a vertex is the first frontier vertex, in queue order, that reaches it.
    ///
    /// # Errors
    /// Returns [`BfsError::VertexOutOfRange`] if `source` is not a vertex.
    #[instrument(skip_all, fields(source = source, vertices = self.graph.vertex_count()))]
    pub fn traverse(&self, source: usize) -> Result<BfsResult, BfsError> {
        self.graph.check_vertex(source)?;
        let n = self.graph.vertex_count();
        let mut distances = vec![-1i32; n];
        let mut parents = vec![-1i32; n];
        let mut queue = VecDeque::new();

        distances[source] = 0;
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            let next = distances[current] + 1;
            // `Graph` caps vertex ids at i32::MAX, so ids narrow losslessly.
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let current_id = current as i32;
            for &neighbor in self.graph.neighbors(current) {
                if distances[neighbor] == -1 {
                    distances[neighbor] = next;
                    parents[neighbor] = current_id;
                    queue.push_back(neighbor);
                }
            }
        }

        let result = BfsResult::from_parts(source, distances, parents)?;
        let stats = result.stats();
        debug!(
            reachable = stats.reachable,
            max_distance = stats.max_distance,
            "sequential traversal finished"
        );
        Ok(result)
    }
}

/// Runs the sequential engine over `graph` from `source`.
///
/// # Errors
/// Returns [`BfsError::VertexOutOfRange`] if `source` is not a vertex.
pub fn cpu_traverse(graph: &Graph, source: usize) -> Result<BfsResult, BfsError> {
    SequentialBfs::new(graph).traverse(source)
}
