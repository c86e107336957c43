//! Error types shared by the graph store, the traversal engines and the compute backends.

use core::fmt;

/// Broad failure classes a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid construction parameters, rejected eagerly.
    Configuration,
    /// Caller-supplied vertex ids or result arrays that do not fit the graph.
    InvalidInput,
    /// No usable device, queue, kernel or pipeline.
    BackendUnavailable,
    /// A device buffer could not be allocated.
    ResourceExhausted,
}

/// The error type for graph construction and traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BfsError {
    /// The requested vertex count cannot be represented.
    InvalidSize {
        /// Requested vertex count.
        vertex_count: usize,
    },
    /// A vertex id outside `[0, vertex_count)`.
    VertexOutOfRange {
        /// Offending vertex id.
        vertex: usize,
        /// Vertex count of the graph.
        vertex_count: usize,
    },
    /// Walking the parent chain from `vertex` did not reach the source.
    MalformedParents {
        /// Vertex the walk started from.
        vertex: usize,
    },
    /// CSR parts that do not describe a graph.
    MalformedCsr {
        /// The violated layout rule.
        reason: &'static str,
    },
    /// `distances` and `parents` disagree on the vertex count.
    ShapeMismatch {
        /// Length of the distance array.
        distances: usize,
        /// Length of the parent array.
        parents: usize,
    },
    /// No compute device could be acquired.
    DeviceUnavailable {
        /// Backend-provided detail.
        reason: String,
    },
    /// The device refused to create a submission queue.
    QueueCreationFailed {
        /// Backend-provided detail.
        reason: String,
    },
    /// The kernel registry has no entry point with this name.
    EntryPointNotFound {
        /// Requested entry point.
        name: String,
    },
    /// The pipeline could not be built for the device.
    PipelineCreationFailed {
        /// Backend-provided detail.
        reason: String,
    },
    /// A buffer bound to the kernel does not have the length the uniforms imply.
    BindingMismatch {
        /// Binding slot name.
        binding: &'static str,
        /// Length implied by the uniforms.
        expected: usize,
        /// Length of the bound buffer.
        actual: usize,
    },
    /// A device buffer could not be allocated.
    BufferAllocationFailed {
        /// Buffer label.
        label: &'static str,
        /// Requested length in 32-bit words.
        words: usize,
    },
    /// Submitted work did not complete.
    DispatchFailed {
        /// Backend-provided detail.
        reason: String,
    },
}

impl BfsError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSize { .. } => ErrorKind::Configuration,
            Self::VertexOutOfRange { .. }
            | Self::MalformedParents { .. }
            | Self::MalformedCsr { .. }
            | Self::ShapeMismatch { .. } => ErrorKind::InvalidInput,
            Self::DeviceUnavailable { .. }
            | Self::QueueCreationFailed { .. }
            | Self::EntryPointNotFound { .. }
            | Self::PipelineCreationFailed { .. }
            | Self::BindingMismatch { .. }
            | Self::DispatchFailed { .. } => ErrorKind::BackendUnavailable,
            Self::BufferAllocationFailed { .. } => ErrorKind::ResourceExhausted,
        }
    }
}

impl fmt::Display for BfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { vertex_count } => {
                write!(f, "invalid vertex count {vertex_count}")
            }
            Self::VertexOutOfRange {
                vertex,
                vertex_count,
            } => write!(f, "vertex {vertex} out of bounds for n={vertex_count}"),
            Self::MalformedParents { vertex } => {
                write!(f, "parent chain from vertex {vertex} does not reach the source")
            }
            Self::MalformedCsr { reason } => write!(f, "malformed CSR: {reason}"),
            Self::ShapeMismatch { distances, parents } => write!(
                f,
                "distances has {distances} entries but parents has {parents}"
            ),
            Self::DeviceUnavailable { reason } => write!(f, "compute device unavailable: {reason}"),
            Self::QueueCreationFailed { reason } => {
                write!(f, "command queue creation failed: {reason}")
            }
            Self::EntryPointNotFound { name } => write!(f, "kernel entry point `{name}` not found"),
            Self::PipelineCreationFailed { reason } => {
                write!(f, "pipeline creation failed: {reason}")
            }
            Self::BindingMismatch {
                binding,
                expected,
                actual,
            } => write!(
                f,
                "binding `{binding}` has {actual} words, expected {expected}"
            ),
            Self::BufferAllocationFailed { label, words } => {
                write!(f, "failed to allocate buffer `{label}` of {words} words")
            }
            Self::DispatchFailed { reason } => write!(f, "dispatch failed: {reason}"),
        }
    }
}

impl std::error::Error for BfsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            BfsError::InvalidSize { vertex_count: 1 }.kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            BfsError::BufferAllocationFailed {
                label: "edges",
                words: 4
            }
            .kind(),
            ErrorKind::ResourceExhausted
        );
        assert_eq!(
            BfsError::EntryPointNotFound {
                name: "nope".into()
            }
            .kind(),
            ErrorKind::BackendUnavailable
        );
        assert_eq!(
            BfsError::MalformedParents { vertex: 3 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            BfsError::MalformedCsr {
                reason: "offsets must start at 0"
            }
            .kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn display_names_the_buffer() {
        let err = BfsError::BufferAllocationFailed {
            label: "distances",
            words: 12,
        };
        assert_eq!(
            err.to_string(),
            "failed to allocate buffer `distances` of 12 words"
        );
    }
}
