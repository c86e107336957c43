//! The host side of level-synchronous parallel BFS.
//!
//! One dispatch of the frontier kernel per level, each followed by a hard wait:
//!
//! ```text
//! Init -> Dispatching(0) -> Syncing(0) -> Dispatching(1) -> ... -> Syncing(L) -> Done
//! ```
//!
//! `Syncing(L)` moves on to `Dispatching(L + 1)` only if some thread raised the
//! progress flag during level `L`; otherwise the frontier is exhausted. At most
//! `vertex_count` levels are dispatched, since no shortest path is longer than
//! `vertex_count - 1` hops.
//!
//! Any error aborts the traversal; the device distances are never read back on
//! failure, so callers never see a partially relaxed array.

use tracing::{debug, instrument, trace, warn};

use crate::{
    compute::{
        default_backend, ComputeBackend, KernelBindings, KernelUniforms, Pipeline,
        BFS_ENTRY_POINT, UNREACHED,
    },
    error::BfsError,
    graph::{CsrGraph, Graph},
    traversal::result::normalize_distances,
};

/// States of the level-synchronous driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Buffers are resident and nothing has been dispatched.
    Init,
    /// The kernel is being submitted for `level`.
    Dispatching {
        /// Level being expanded.
        level: u32,
    },
    /// The host is blocked on the submission for `level`.
    Syncing {
        /// Level being expanded.
        level: u32,
    },
    /// The frontier is exhausted.
    Done {
        /// Number of levels dispatched.
        levels: u32,
    },
}

/// Output of a completed level-synchronous traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSyncReport {
    /// Hop counts from the source, `-1` where unreached.
    pub distances: Vec<i32>,
    /// Number of levels dispatched, the final (empty) one included.
    pub levels: u32,
}

/// Drives the frontier kernel to convergence on a [`ComputeBackend`].
///
/// The pipeline is built once at construction; a driver can then run any number
/// of traversals, from any source, over any graph.
#[derive(Debug)]
pub struct LevelSyncDriver<B> {
    backend: B,
    pipeline: Pipeline,
}

impl<B: ComputeBackend> LevelSyncDriver<B> {
    /// Builds the frontier pipeline on `backend`.
    ///
    /// # Errors
    /// Returns the backend's pipeline error ([`BfsError::EntryPointNotFound`],
    /// [`BfsError::PipelineCreationFailed`]) before any traversal state exists.
    pub fn new(backend: B) -> Result<Self, BfsError> {
        let pipeline = backend.create_pipeline(BFS_ENTRY_POINT)?;
        debug!(
            device = %backend.info().name,
            threads_per_group = pipeline.threads_per_group(),
            "frontier pipeline created"
        );
        Ok(Self { backend, pipeline })
    }

    /// The backend this driver dispatches to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The compiled frontier pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Returns the distances from `source`, `-1` where unreached.
    ///
    /// The CSR encoding is rebuilt from `graph` on every call.
    ///
    /// # Errors
    /// See [`run_csr`](Self::run_csr).
    pub fn traverse(&self, graph: &Graph, source: usize) -> Result<Vec<i32>, BfsError> {
        self.run(graph, source).map(|report| report.distances)
    }

    /// Like [`traverse`](Self::traverse), also reporting the number of levels.
    ///
    /// # Errors
    /// See [`run_csr`](Self::run_csr).
    pub fn run(&self, graph: &Graph, source: usize) -> Result<LevelSyncReport, BfsError> {
        graph.check_vertex(source)?;
        self.run_csr(&graph.to_csr(), source)
    }

    /// Traverses an existing CSR snapshot.
    ///
    /// # Errors
    /// - [`BfsError::VertexOutOfRange`] if `source` is not a node of `csr`
    /// - [`BfsError::BufferAllocationFailed`] if any buffer, including a per-level
    ///   uniform block, cannot be allocated
    /// - any dispatch or wait error of the backend
    pub fn run_csr(&self, csr: &CsrGraph, source: usize) -> Result<LevelSyncReport, BfsError> {
        self.run_observed(csr, source, |_| {})
    }

    /// Like [`run_csr`](Self::run_csr), calling `observe` on every state entered.
    ///
    /// # Errors
    /// See [`run_csr`](Self::run_csr).
    #[instrument(skip_all, fields(source = source, vertices = csr.node_count(), edges = csr.edge_count()))]
    pub fn run_observed(
        &self,
        csr: &CsrGraph,
        source: usize,
        mut observe: impl FnMut(DriverState),
    ) -> Result<LevelSyncReport, BfsError> {
        let n = csr.node_count();
        if source >= n {
            return Err(BfsError::VertexOutOfRange {
                vertex: source,
                vertex_count: n,
            });
        }

        let vertex_count = u32::try_from(n).map_err(|_| BfsError::InvalidSize { vertex_count: n })?;
        let (offsets, edges) = csr.device_words()?;
        let edge_count = u32::try_from(edges.len()).map_err(|_| BfsError::BufferAllocationFailed {
            label: "edges",
            words: edges.len(),
        })?;

        let mut initial = vec![UNREACHED; n];
        initial[source] = 0;
        let distances = self.backend.allocate("distances", &initial)?;
        let edges = self.backend.allocate("edges", &edges)?;
        let offsets = self.backend.allocate("offsets", &offsets)?;
        let progress = self.backend.allocate_flag()?;

        let mut state = DriverState::Init;
        let mut pending = None;
        let levels = loop {
            observe(state);
            state = match state {
                DriverState::Init => DriverState::Dispatching { level: 0 },
                DriverState::Dispatching { level } if level >= vertex_count => {
                    warn!(level, "level cap reached before the frontier emptied");
                    DriverState::Done { levels: level }
                }
                DriverState::Dispatching { level } => {
                    progress.reset();
                    let uniforms = self.backend.allocate_uniforms(&KernelUniforms {
                        vertex_count,
                        level,
                        edge_count,
                    })?;
                    let bindings = KernelBindings {
                        distances: distances.clone(),
                        edges: edges.clone(),
                        offsets: offsets.clone(),
                        progress: progress.clone(),
                        uniforms,
                    };
                    pending = Some(self.backend.dispatch(&self.pipeline, &bindings, n)?);
                    DriverState::Syncing { level }
                }
                DriverState::Syncing { level } => {
                    if let Some(submission) = pending.take() {
                        self.backend.wait(submission)?;
                    }
                    let advanced = progress.is_raised();
                    trace!(level, advanced, "level synchronized");
                    if advanced {
                        DriverState::Dispatching { level: level + 1 }
                    } else {
                        DriverState::Done { levels: level + 1 }
                    }
                }
                DriverState::Done { levels } => break levels,
            };
        };

        let distances = normalize_distances(&distances.read_back());
        debug!(
            levels,
            reached = distances.iter().filter(|&&d| d != -1).count(),
            "level-synchronous traversal finished"
        );
        Ok(LevelSyncReport { distances, levels })
    }
}

/// Runs the level-synchronous engine on the [default backend](default_backend).
///
/// Returns distances only; the parallel engine does not build a parent tree.
///
/// # Errors
/// Any backend acquisition, pipeline, allocation or dispatch error, or
/// [`BfsError::VertexOutOfRange`] for a bad `source`.
pub fn gpu_traverse(graph: &Graph, source: usize) -> Result<Vec<i32>, BfsError> {
    LevelSyncDriver::new(default_backend()?)?.traverse(graph, source)
}
