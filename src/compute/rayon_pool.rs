//! A rayon thread-pool device.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;

use crate::{
    compute::{
        panic_message, BackendConfig, ComputeBackend, DeviceInfo, KernelBindings, Pipeline,
        Submission,
    },
    error::BfsError,
};

/// Runs thread-groups as rayon tasks on a dedicated pool.
///
/// The pool plays the role of the command queue; `dispatch` blocks inside
/// [`rayon::ThreadPool::install`] so submissions are complete on return.
#[derive(Debug)]
pub struct RayonBackend {
    info: DeviceInfo,
    pool: rayon::ThreadPool,
}

impl RayonBackend {
    /// Creates the device and its pool.
    ///
    /// # Errors
    /// - [`BfsError::DeviceUnavailable`] if the worker count resolves to zero
    /// - [`BfsError::QueueCreationFailed`] if the pool cannot be built
    pub fn new(config: BackendConfig) -> Result<Self, BfsError> {
        let workers = config.resolve_threads()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bfs-rayon-{i}"))
            .build()
            .map_err(|e| BfsError::QueueCreationFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            info: DeviceInfo {
                name: format!("rayon x{workers}"),
                max_threads_per_group: config.max_group_size,
                workers,
            },
            pool,
        })
    }
}

impl ComputeBackend for RayonBackend {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn dispatch(
        &self,
        pipeline: &Pipeline,
        bindings: &KernelBindings,
        width: usize,
    ) -> Result<Submission, BfsError> {
        let bound = pipeline.bind(bindings)?;
        let groups = pipeline.group_count(width);
        catch_unwind(AssertUnwindSafe(|| {
            self.pool.install(|| {
                (0..groups)
                    .into_par_iter()
                    .for_each(|group| bound.run_group(group, width));
            });
        }))
        .map_err(|payload| BfsError::DispatchFailed {
            reason: panic_message(payload.as_ref()),
        })?;
        Ok(Submission::completed())
    }
}
