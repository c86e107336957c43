//! A scoped-thread worker pool device.

use core::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use crate::{
    compute::{BackendConfig, ComputeBackend, DeviceInfo, KernelBindings, Pipeline, Submission},
    error::BfsError,
};

/// Runs thread-groups on `workers` scoped threads.
///
/// Each dispatch is handed to a coordinator thread and returns a pending
/// [`Submission`]; the coordinator spawns the workers with `std::thread::scope`
/// and they pull group indices from a shared counter until none are left.
/// Joining the coordinator is the level barrier.
#[derive(Debug, Clone)]
pub struct ThreadPoolBackend {
    info: DeviceInfo,
}

impl ThreadPoolBackend {
    /// Creates the device.
    ///
    /// # Errors
    /// Returns [`BfsError::DeviceUnavailable`] if the worker count resolves to zero
    /// or cannot be determined.
    pub fn new(config: BackendConfig) -> Result<Self, BfsError> {
        let workers = config.resolve_threads()?;
        Ok(Self {
            info: DeviceInfo {
                name: format!("scoped-threads x{workers}"),
                max_threads_per_group: config.max_group_size,
                workers,
            },
        })
    }
}

impl ComputeBackend for ThreadPoolBackend {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn dispatch(
        &self,
        pipeline: &Pipeline,
        bindings: &KernelBindings,
        width: usize,
    ) -> Result<Submission, BfsError> {
        // Validate on the caller's thread so binding errors surface from dispatch.
        pipeline.bind(bindings)?;

        let groups = pipeline.group_count(width);
        if groups == 0 {
            return Ok(Submission::completed());
        }
        let workers = self.info.workers.min(groups);
        trace!(groups, workers, "submitting to scoped workers");

        let pipeline = *pipeline;
        let bindings = bindings.clone();
        let handle = std::thread::Builder::new()
            .name("bfs-dispatch".into())
            .spawn(move || -> Result<(), BfsError> {
                let bound = pipeline.bind(&bindings)?;
                let next = AtomicUsize::new(0);
                std::thread::scope(|scope| {
                    for _ in 0..workers {
                        scope.spawn(|| loop {
                            let group = next.fetch_add(1, Ordering::Relaxed);
                            if group >= groups {
                                break;
                            }
                            bound.run_group(group, width);
                        });
                    }
                });
                Ok(())
            })
            .map_err(|e| BfsError::DispatchFailed {
                reason: e.to_string(),
            })?;
        Ok(Submission::pending(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compute::{DeviceBuffer, KernelUniforms, UniformBuffer, BFS_ENTRY_POINT, UNREACHED},
        concurrency::atomic::ProgressFlag,
    };

    /// Level 0 of the chain `0 -> 1 -> 2`, with `offsets` as given.
    fn chain_bindings(offsets: &[u32]) -> KernelBindings {
        KernelBindings {
            distances: DeviceBuffer::from_slice("distances", &[0, UNREACHED, UNREACHED]).unwrap(),
            edges: DeviceBuffer::from_slice("edges", &[1, 2]).unwrap(),
            offsets: DeviceBuffer::from_slice("offsets", offsets).unwrap(),
            progress: ProgressFlag::new(),
            uniforms: UniformBuffer::new(&KernelUniforms {
                vertex_count: 3,
                level: 0,
                edge_count: 2,
            })
            .unwrap(),
        }
    }

    #[test]
    fn dispatch_is_observed_only_after_wait() {
        let b = ThreadPoolBackend::new(BackendConfig::default().with_threads(2).with_max_group_size(1))
            .unwrap();
        let pipeline = b.create_pipeline(BFS_ENTRY_POINT).unwrap();
        let bindings = chain_bindings(&[0, 1, 2, 2]);

        let submission = b.dispatch(&pipeline, &bindings, 3).unwrap();
        b.wait(submission).unwrap();
        assert_eq!(bindings.distances.read_back(), vec![0, 1, UNREACHED]);
        assert!(bindings.progress.is_raised());
    }

    #[test]
    fn mismatched_bindings_never_complete() {
        let b = ThreadPoolBackend::new(BackendConfig::default().with_threads(2)).unwrap();
        let pipeline = b.create_pipeline(BFS_ENTRY_POINT).unwrap();
        let bindings = chain_bindings(&[0, 1]);

        let err = b.dispatch(&pipeline, &bindings, 3).unwrap_err();
        assert!(matches!(err, BfsError::BindingMismatch { binding: "offsets", .. }));
        assert_eq!(bindings.distances.read_back(), vec![0, UNREACHED, UNREACHED]);
        assert!(!bindings.progress.is_raised());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = ThreadPoolBackend::new(BackendConfig::default().with_threads(0)).unwrap_err();
        assert!(matches!(err, BfsError::DeviceUnavailable { .. }));
    }

    #[test]
    fn info_reflects_config() {
        let b = ThreadPoolBackend::new(
            BackendConfig::default()
                .with_threads(3)
                .with_max_group_size(64),
        )
        .unwrap();
        assert_eq!(b.info().workers, 3);
        assert_eq!(b.create_pipeline(crate::compute::BFS_ENTRY_POINT).unwrap().threads_per_group(), 64);
    }
}
