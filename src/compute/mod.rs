//! The compute backend boundary.
//!
//! A backend is anything that can allocate device-visible word buffers, build a
//! pipeline for the frontier kernel, submit it over an `N`-wide index space and
//! block until the submission completes. The level-synchronous driver only talks
//! to [`ComputeBackend`], so backends are interchangeable:
//! - [`SerialBackend`]: every group in order on the calling thread
//! - [`ThreadPoolBackend`]: scoped worker threads pulling groups from a shared counter
//! - `RayonBackend` (feature `parallel`): a dedicated rayon pool

pub mod buffer;
pub mod kernel;
#[cfg(feature = "parallel")]
pub mod rayon_pool;
pub mod serial;
pub mod threads;

use std::thread::JoinHandle;

pub use buffer::{DeviceBuffer, UniformBuffer};
pub use kernel::{KernelBindings, KernelUniforms, Pipeline, BFS_ENTRY_POINT, UNREACHED};
#[cfg(feature = "parallel")]
pub use rayon_pool::RayonBackend;
pub use serial::SerialBackend;
pub use threads::ThreadPoolBackend;

use crate::{concurrency::atomic::ProgressFlag, error::BfsError};

/// Static description of a compute device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Human-readable device name.
    pub name: String,
    /// Largest thread-group the device can run.
    pub max_threads_per_group: usize,
    /// Number of groups the device can run at once.
    pub workers: usize,
}

/// Tunables shared by the built-in backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendConfig {
    /// Worker count; `None` uses the available parallelism.
    pub threads: Option<usize>,
    /// Largest thread-group the backend reports.
    pub max_group_size: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            threads: None,
            max_group_size: kernel::MAX_THREADS_PER_GROUP,
        }
    }
}

impl BackendConfig {
    /// Sets an explicit worker count.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Sets the reported maximum thread-group size.
    #[must_use]
    pub fn with_max_group_size(mut self, max_group_size: usize) -> Self {
        self.max_group_size = max_group_size;
        self
    }

    /// Resolves the worker count.
    ///
    /// # Errors
    /// Returns [`BfsError::DeviceUnavailable`] if the count is zero or cannot be determined.
    pub fn resolve_threads(&self) -> Result<usize, BfsError> {
        let threads = match self.threads {
            Some(t) => t,
            None => std::thread::available_parallelism()
                .map_err(|e| BfsError::DeviceUnavailable {
                    reason: e.to_string(),
                })?
                .get(),
        };
        if threads == 0 {
            return Err(BfsError::DeviceUnavailable {
                reason: "zero worker threads requested".into(),
            });
        }
        Ok(threads)
    }
}

/// Handle to submitted work.
///
/// Work may already be complete when [`ComputeBackend::dispatch`] returns, or may
/// still be running on a coordinator thread. Either way nothing written by the
/// kernel may be inspected before [`wait_until_completed`](Self::wait_until_completed).
#[derive(Debug)]
#[must_use = "a submission must be waited on before reading its buffers"]
pub struct Submission {
    state: SubmissionState,
}

#[derive(Debug)]
enum SubmissionState {
    Completed,
    Pending(JoinHandle<Result<(), BfsError>>),
}

impl Submission {
    /// A submission that finished during dispatch.
    pub fn completed() -> Self {
        Self {
            state: SubmissionState::Completed,
        }
    }

    /// A submission running on `handle`; its result is reported by the wait.
    pub fn pending(handle: JoinHandle<Result<(), BfsError>>) -> Self {
        Self {
            state: SubmissionState::Pending(handle),
        }
    }

    /// Blocks until the work completes.
    ///
    /// # Errors
    /// Returns [`BfsError::DispatchFailed`] if a worker panicked, or the error the
    /// pending work itself returned.
    pub fn wait_until_completed(self) -> Result<(), BfsError> {
        match self.state {
            SubmissionState::Completed => Ok(()),
            SubmissionState::Pending(handle) => {
                handle.join().map_err(|payload| BfsError::DispatchFailed {
                    reason: panic_message(payload.as_ref()),
                })?
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_owned()
    }
}

/// A device the level-synchronous driver can run the frontier kernel on.
///
/// Only [`info`](Self::info) and [`dispatch`](Self::dispatch) are required; the
/// allocation hooks default to host-visible memory and may be overridden by
/// backends with their own allocator (or by tests injecting failures).
pub trait ComputeBackend {
    /// Describes the device.
    fn info(&self) -> &DeviceInfo;

    /// Builds the pipeline for `entry_point`.
    ///
    /// # Errors
    /// See [`Pipeline::compile`].
    fn create_pipeline(&self, entry_point: &str) -> Result<Pipeline, BfsError> {
        Pipeline::compile(entry_point, self.info().max_threads_per_group)
    }

    /// Allocates a word buffer initialized from `contents`.
    ///
    /// # Errors
    /// Returns [`BfsError::BufferAllocationFailed`] if the memory cannot be reserved.
    fn allocate(&self, label: &'static str, contents: &[u32]) -> Result<DeviceBuffer, BfsError> {
        DeviceBuffer::from_slice(label, contents)
    }

    /// Allocates a lowered progress flag.
    ///
    /// # Errors
    /// Returns [`BfsError::BufferAllocationFailed`] if the memory cannot be reserved.
    fn allocate_flag(&self) -> Result<ProgressFlag, BfsError> {
        Ok(ProgressFlag::new())
    }

    /// Allocates a uniform block for one dispatch.
    ///
    /// # Errors
    /// Returns [`BfsError::BufferAllocationFailed`] if the memory cannot be reserved.
    fn allocate_uniforms(&self, uniforms: &KernelUniforms) -> Result<UniformBuffer, BfsError> {
        UniformBuffer::new(uniforms)
    }

    /// Submits `pipeline` over `width` threads with `bindings`.
    ///
    /// # Errors
    /// Returns [`BfsError::BindingMismatch`] if the bindings do not validate, or a
    /// backend-specific error if the work cannot be submitted.
    fn dispatch(
        &self,
        pipeline: &Pipeline,
        bindings: &KernelBindings,
        width: usize,
    ) -> Result<Submission, BfsError>;

    /// Blocks until `submission` completes.
    ///
    /// # Errors
    /// Returns [`BfsError::DispatchFailed`] if the work did not complete.
    fn wait(&self, submission: Submission) -> Result<(), BfsError> {
        submission.wait_until_completed()
    }
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for &B {
    fn info(&self) -> &DeviceInfo {
        (**self).info()
    }

    fn create_pipeline(&self, entry_point: &str) -> Result<Pipeline, BfsError> {
        (**self).create_pipeline(entry_point)
    }

    fn allocate(&self, label: &'static str, contents: &[u32]) -> Result<DeviceBuffer, BfsError> {
        (**self).allocate(label, contents)
    }

    fn allocate_flag(&self) -> Result<ProgressFlag, BfsError> {
        (**self).allocate_flag()
    }

    fn allocate_uniforms(&self, uniforms: &KernelUniforms) -> Result<UniformBuffer, BfsError> {
        (**self).allocate_uniforms(uniforms)
    }

    fn dispatch(
        &self,
        pipeline: &Pipeline,
        bindings: &KernelBindings,
        width: usize,
    ) -> Result<Submission, BfsError> {
        (**self).dispatch(pipeline, bindings, width)
    }

    fn wait(&self, submission: Submission) -> Result<(), BfsError> {
        (**self).wait(submission)
    }
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for Box<B> {
    fn info(&self) -> &DeviceInfo {
        (**self).info()
    }

    fn create_pipeline(&self, entry_point: &str) -> Result<Pipeline, BfsError> {
        (**self).create_pipeline(entry_point)
    }

    fn allocate(&self, label: &'static str, contents: &[u32]) -> Result<DeviceBuffer, BfsError> {
        (**self).allocate(label, contents)
    }

    fn allocate_flag(&self) -> Result<ProgressFlag, BfsError> {
        (**self).allocate_flag()
    }

    fn allocate_uniforms(&self, uniforms: &KernelUniforms) -> Result<UniformBuffer, BfsError> {
        (**self).allocate_uniforms(uniforms)
    }

    fn dispatch(
        &self,
        pipeline: &Pipeline,
        bindings: &KernelBindings,
        width: usize,
    ) -> Result<Submission, BfsError> {
        (**self).dispatch(pipeline, bindings, width)
    }

    fn wait(&self, submission: Submission) -> Result<(), BfsError> {
        (**self).wait(submission)
    }
}

/// Acquires the default backend for this build.
///
/// With the `parallel` feature this is a [`RayonBackend`]; otherwise a
/// [`ThreadPoolBackend`] sized to the available parallelism.
///
/// # Errors
/// Returns [`BfsError::DeviceUnavailable`] or [`BfsError::QueueCreationFailed`]
/// if no worker pool can be created.
pub fn default_backend() -> Result<Box<dyn ComputeBackend + Send + Sync>, BfsError> {
    #[cfg(feature = "parallel")]
    {
        Ok(Box::new(RayonBackend::new(BackendConfig::default())?))
    }
    #[cfg(not(feature = "parallel"))]
    {
        Ok(Box::new(ThreadPoolBackend::new(BackendConfig::default())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_resolves_explicit_threads() {
        let cfg = BackendConfig::default().with_threads(3).with_max_group_size(32);
        assert_eq!(cfg.resolve_threads(), Ok(3));
        assert_eq!(cfg.max_group_size, 32);
    }

    #[test]
    fn zero_threads_is_device_unavailable() {
        let cfg = BackendConfig::default().with_threads(0);
        assert!(matches!(
            cfg.resolve_threads(),
            Err(BfsError::DeviceUnavailable { .. })
        ));
    }

    #[test]
    fn pending_submission_reports_panics() {
        let handle = std::thread::spawn(|| panic!("group 3 faulted"));
        let err = Submission::pending(handle).wait_until_completed().unwrap_err();
        assert_eq!(
            err,
            BfsError::DispatchFailed {
                reason: "group 3 faulted".into()
            }
        );
    }

    #[test]
    fn pending_submission_reports_its_error() {
        let handle = std::thread::spawn(|| {
            Err(BfsError::BindingMismatch {
                binding: "offsets",
                expected: 4,
                actual: 2,
            })
        });
        let err = Submission::pending(handle).wait_until_completed().unwrap_err();
        assert!(matches!(err, BfsError::BindingMismatch { binding: "offsets", .. }));
    }

    #[test]
    fn default_backend_is_usable() {
        let backend = default_backend().unwrap();
        assert!(backend.info().workers > 0);
        assert!(backend.create_pipeline(BFS_ENTRY_POINT).is_ok());
    }
}
