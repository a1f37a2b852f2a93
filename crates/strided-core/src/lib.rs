//! Core of the strided async copy conformance suite.
//!
//! - [`planner`]: derives an [`ExecutionGeometry`] that fits the device's
//!   local memory, global memory and work-group limits.
//! - [`sweep`]: the lazy, restartable type × width × stride enumeration.
//! - [`verify`]: strided comparison of reference and observed buffers.
//! - [`executor`]: the [`TransferExecutor`] seam that compiles and runs kernels.
//!
//! Everything here is pure. Device access lives behind [`TransferExecutor`]
//! implementations in collaborator crates.

pub mod executor;
pub mod planner;
pub mod sweep;
pub mod verify;

pub use executor::{TransferExecutor, check_input_len};
pub use planner::{COPIES_PER_WORK_ITEM, ExecutionGeometry, PlannerLimits, plan_geometry};
pub use sweep::{SWEEP_STRIDES, TransferSpecSweep};
pub use verify::{Mismatch, StridedVerifier, VerificationResult, VerifyError, verify};
