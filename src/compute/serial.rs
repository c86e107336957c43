//! A single-threaded reference device.

use crate::{
    compute::{BackendConfig, ComputeBackend, DeviceInfo, KernelBindings, Pipeline, Submission},
    error::BfsError,
};

/// Runs every thread-group in order on the calling thread.
///
/// Dispatches complete before [`dispatch`](ComputeBackend::dispatch) returns, so
/// results are deterministic. Useful as a baseline and in tests.
#[derive(Debug, Clone)]
pub struct SerialBackend {
    info: DeviceInfo,
}

impl SerialBackend {
    /// Creates the device. Only `max_group_size` of `config` is used.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            info: DeviceInfo {
                name: "serial".into(),
                max_threads_per_group: config.max_group_size,
                workers: 1,
            },
        }
    }
}

impl Default for SerialBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

impl ComputeBackend for SerialBackend {
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
        for group in 0..pipeline.group_count(width) {
            bound.run_group(group, width);
        }
        Ok(Submission::completed())
    }
}
