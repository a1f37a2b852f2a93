//! Error taxonomy shared across the conformance suite.
//!
//! Severity is decided by the orchestrator, not by the error type:
//! [`PlanError`] skips one sweep entry, [`ExecutionError`] fails one sweep
//! entry, and [`ProbeError`] aborts the whole sweep.

/// Invalid [`TransferSpec`](crate::TransferSpec) construction or parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    #[error("stride must be >= 1")]
    ZeroStride,

    #[error("unsupported vector width {0} (expected one of 1, 2, 3, 4, 8, 16)")]
    UnsupportedVectorWidth(u32),

    #[error("unknown element type: {0}")]
    UnknownElementType(String),
}

/// No execution geometry satisfies the device limits for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("resource exhausted: {reason}")]
    ResourceExhausted { reason: String },
}

impl PlanError {
    pub fn resource_exhausted(reason: impl Into<String>) -> Self {
        Self::ResourceExhausted { reason: reason.into() }
    }
}

/// Capability query failure. Without a snapshot nothing can be planned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("no compute platforms found")]
    NoPlatforms,

    #[error("no device at platform {platform_index}, device {device_index}")]
    NoDevice { platform_index: usize, device_index: usize },

    #[error("device query {query} failed: {reason}")]
    QueryFailed { query: &'static str, reason: String },

    #[error("unknown device profile: {0}")]
    UnknownProfile(String),

    #[error("backend not compiled into this build: {0}")]
    BackendUnavailable(String),
}

/// Failure inside the execution collaborator for one sweep entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("kernel '{kernel}' failed to compile: {log}")]
    CompileFailed { kernel: String, log: String },

    #[error("kernel work-group query failed: {0}")]
    WorkGroupQuery(String),

    #[error("buffer allocation of {size_bytes} bytes failed: {reason}")]
    AllocationFailed { size_bytes: u64, reason: String },

    #[error("kernel launch failed: {0}")]
    LaunchFailed(String),

    #[error("read back failed: {0}")]
    ReadFailed(String),

    #[error("input buffer is {actual} bytes, geometry needs {expected}")]
    InputSize { expected: u64, actual: u64 },
}
