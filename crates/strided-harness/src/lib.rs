//! Conformance orchestration for strided async copies.
//!
//! [`ConformanceRunner`] walks a [`TransferSpecSweep`](strided_core::TransferSpecSweep)
//! for each copy direction and records one [`EntryReport`] per transfer.
//! [`ReferenceExecutor`] runs the copy on the host so the whole pipeline can
//! be exercised without a device.

pub mod data;
pub mod reference;
pub mod report;
pub mod runner;

pub use data::InputGenerator;
pub use reference::{DEFAULT_REFERENCE_WORK_GROUP_LIMIT, Fault, ReferenceExecutor, ReferenceKernel};
pub use report::{DirectionReport, EntryOutcome, EntryReport, Summary, SweepReport};
pub use runner::{ConformanceRunner, RunOptions};
