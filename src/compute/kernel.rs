//! The frontier relaxation kernel and its pipeline.
//!
//! One invocation per vertex per level. An invocation for vertex `v` at level `L`:
//! - does nothing unless `distances[v] == L` (`v` is on the frontier)
//! - otherwise, for every neighbor `u` still at [`UNREACHED`], stores `L + 1`
//!   into `distances[u]` and raises the progress flag
//!
//! Invocations run in any order and interleaving. Racing writers to the same `u`
//! at level `L` all store `L + 1`, so the race is benign and needs no RMW.

use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::{
    compute::buffer::{DeviceBuffer, UniformBuffer},
    concurrency::atomic::ProgressFlag,
    error::BfsError,
};

/// Device sentinel for "not yet reached".
pub const UNREACHED: u32 = u32::MAX;

/// Entry point name of the frontier relaxation kernel.
pub const BFS_ENTRY_POINT: &str = "bfs_kernel";

/// Upper bound on threads per group, whatever the device reports.
pub const MAX_THREADS_PER_GROUP: usize = 256;

/// The three integer uniforms of a level.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct KernelUniforms {
    /// Number of vertices (width of the index space).
    pub vertex_count: u32,
    /// Level being expanded.
    pub level: u32,
    /// Number of edges.
    pub edge_count: u32,
}

/// The buffers bound to one dispatch.
#[derive(Debug, Clone)]
pub struct KernelBindings {
    /// `vertex_count` words, [`UNREACHED`] or a level.
    pub distances: DeviceBuffer,
    /// `edge_count` neighbor ids.
    pub edges: DeviceBuffer,
    /// `vertex_count + 1` row offsets.
    pub offsets: DeviceBuffer,
    /// Raised when any distance was written.
    pub progress: ProgressFlag,
    /// The level's uniform block.
    pub uniforms: UniformBuffer,
}

type KernelFn = fn(usize, &KernelUniforms, &KernelBindings);

const ENTRY_POINTS: &[(&str, KernelFn)] = &[(BFS_ENTRY_POINT, relax_frontier)];

fn relax_frontier(gid: usize, uniforms: &KernelUniforms, b: &KernelBindings) {
    if gid >= uniforms.vertex_count as usize {
        return;
    }
    let level = uniforms.level;
    if b.distances.load(gid) != level {
        return;
    }
    let start = b.offsets.load(gid) as usize;
    let end = b.offsets.load(gid + 1) as usize;
    for i in start..end {
        let u = b.edges.load(i) as usize;
        if b.distances.load(u) == UNREACHED {
            b.distances.store(u, level + 1);
            b.progress.raise();
        }
    }
}

/// A compiled compute pipeline: one kernel entry point plus its group size.
#[derive(Clone, Copy)]
pub struct Pipeline {
    entry_point: &'static str,
    kernel: KernelFn,
    threads_per_group: usize,
}

impl core::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("entry_point", &self.entry_point)
            .field("threads_per_group", &self.threads_per_group)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Resolves `entry_point` and sizes thread-groups for a device whose groups
    /// hold at most `device_max_group` threads.
    ///
    /// # Errors
    /// - [`BfsError::EntryPointNotFound`] if no kernel has that name
    /// - [`BfsError::PipelineCreationFailed`] if `device_max_group == 0`
    pub fn compile(entry_point: &str, device_max_group: usize) -> Result<Self, BfsError> {
        let &(name, kernel) = ENTRY_POINTS
            .iter()
            .find(|(name, _)| *name == entry_point)
            .ok_or_else(|| BfsError::EntryPointNotFound {
                name: entry_point.to_owned(),
            })?;
        if device_max_group == 0 {
            return Err(BfsError::PipelineCreationFailed {
                reason: "device reports zero threads per group".into(),
            });
        }
        Ok(Self {
            entry_point: name,
            kernel,
            threads_per_group: device_max_group.min(MAX_THREADS_PER_GROUP),
        })
    }

    /// Name of the compiled entry point.
    pub fn entry_point(&self) -> &'static str {
        self.entry_point
    }

    /// Threads per group.
    pub fn threads_per_group(&self) -> usize {
        self.threads_per_group
    }

    /// Number of groups covering an index space of `width` threads.
    pub fn group_count(&self, width: usize) -> usize {
        width.div_ceil(self.threads_per_group)
    }

    /// Validates `bindings` against their uniforms and binds them.
    ///
    /// # Errors
    /// - [`BfsError::BindingMismatch`] if a buffer length disagrees with the uniforms
    ///   or the uniform block does not decode
    pub fn bind<'a>(&self, bindings: &'a KernelBindings) -> Result<BoundKernel<'a>, BfsError> {
        let uniforms = bindings
            .uniforms
            .decode()
            .ok_or(BfsError::BindingMismatch {
                binding: "uniforms",
                expected: core::mem::size_of::<KernelUniforms>(),
                actual: bindings.uniforms.as_bytes().len(),
            })?;
        let n = uniforms.vertex_count as usize;
        let m = uniforms.edge_count as usize;
        check_len("distances", &bindings.distances, n)?;
        check_len("offsets", &bindings.offsets, n + 1)?;
        check_len("edges", &bindings.edges, m)?;
        Ok(BoundKernel {
            kernel: self.kernel,
            threads_per_group: self.threads_per_group,
            uniforms,
            bindings,
        })
    }
}

fn check_len(binding: &'static str, buf: &DeviceBuffer, expected: usize) -> Result<(), BfsError> {
    if buf.len() == expected {
        Ok(())
    } else {
        Err(BfsError::BindingMismatch {
            binding,
            expected,
            actual: buf.len(),
        })
    }
}

/// A pipeline with validated bindings, ready to run thread-groups.
#[derive(Clone, Copy)]
pub struct BoundKernel<'a> {
    kernel: KernelFn,
    threads_per_group: usize,
    uniforms: KernelUniforms,
    bindings: &'a KernelBindings,
}

impl core::fmt::Debug for BoundKernel<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoundKernel")
            .field("threads_per_group", &self.threads_per_group)
            .field("uniforms", &self.uniforms)
            .finish_non_exhaustive()
    }
}

impl BoundKernel<'_> {
    /// Runs every thread of `group` whose global id is below `width`.
    #[inline]
    pub fn run_group(&self, group: usize, width: usize) {
        let start = group * self.threads_per_group;
        let end = (start + self.threads_per_group).min(width);
        for gid in start..end {
            (self.kernel)(gid, &self.uniforms, self.bindings);
        }
    }

    /// Uniforms decoded at bind time.
    pub fn uniforms(&self) -> &KernelUniforms {
        &self.uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(distances: &[u32], offsets: &[u32], edges: &[u32], level: u32) -> KernelBindings {
        let uniforms = KernelUniforms {
            vertex_count: distances.len() as u32,
            level,
            edge_count: edges.len() as u32,
        };
        KernelBindings {
            distances: DeviceBuffer::from_slice("distances", distances).unwrap(),
            edges: DeviceBuffer::from_slice("edges", edges).unwrap(),
            offsets: DeviceBuffer::from_slice("offsets", offsets).unwrap(),
            progress: ProgressFlag::new(),
            uniforms: UniformBuffer::new(&uniforms).unwrap(),
        }
    }

    fn run_all(pipeline: &Pipeline, b: &KernelBindings) {
        let bound = pipeline.bind(b).unwrap();
        let width = b.distances.len();
        for group in 0..pipeline.group_count(width) {
            bound.run_group(group, width);
        }
    }

    #[test]
    fn relaxes_only_frontier_vertices() {
        // 0 -> 1, 1 -> 2
        const U: u32 = UNREACHED;
        let b = bindings(&[0, U, U], &[0, 1, 2, 2], &[1, 2], 0);
        let p = Pipeline::compile(BFS_ENTRY_POINT, 64).unwrap();
        run_all(&p, &b);
        assert_eq!(b.distances.read_back(), vec![0, 1, U]);
        assert!(b.progress.is_raised());
    }

    #[test]
    fn self_loops_and_visited_neighbors_are_no_ops() {
        // 0 -> 0, 0 -> 1 where 1 is already at level 0
        let b = bindings(&[0, 0], &[0, 2, 2], &[0, 1], 0);
        let p = Pipeline::compile(BFS_ENTRY_POINT, 64).unwrap();
        run_all(&p, &b);
        assert_eq!(b.distances.read_back(), vec![0, 0]);
        assert!(!b.progress.is_raised());
    }

    #[test]
    fn group_size_is_capped() {
        let p = Pipeline::compile(BFS_ENTRY_POINT, 1024).unwrap();
        assert_eq!(p.threads_per_group(), MAX_THREADS_PER_GROUP);
        assert_eq!(p.group_count(257), 2);
        assert_eq!(p.group_count(0), 0);
        assert_eq!(p.entry_point(), BFS_ENTRY_POINT);
    }

    #[test]
    fn unknown_entry_point() {
        assert_eq!(
            Pipeline::compile("dfs_kernel", 64).unwrap_err(),
            BfsError::EntryPointNotFound {
                name: "dfs_kernel".into()
            }
        );
    }

    #[test]
    fn zero_group_size_fails_pipeline_creation() {
        assert!(matches!(
            Pipeline::compile(BFS_ENTRY_POINT, 0),
            Err(BfsError::PipelineCreationFailed { .. })
        ));
    }

    #[test]
    fn bind_rejects_short_offsets() {
        let mut b = bindings(&[0, UNREACHED], &[0, 1, 1], &[1], 0);
        b.offsets = DeviceBuffer::from_slice("offsets", &[0, 1]).unwrap();
        let p = Pipeline::compile(BFS_ENTRY_POINT, 64).unwrap();
        assert_eq!(
            p.bind(&b).unwrap_err(),
            BfsError::BindingMismatch {
                binding: "offsets",
                expected: 3,
                actual: 2
            }
        );
    }
}
