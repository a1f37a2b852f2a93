//! Subcommand implementations.
//!
//! Each command returns the process exit code on success; errors are mapped
//! by [`crate::exit::exit_code_for`].

mod info;
mod plan;
mod run;
mod sweep;

pub use info::InfoCommand;
pub use plan::PlanCommand;
pub use run::RunCommand;
pub use sweep::SweepCommand;

use strided_common::ElementType;
use strided_core::{SWEEP_STRIDES, TransferSpecSweep};
use strided_device_probe::CapabilitySnapshot;

/// Full sweep, or a restricted one when types or strides were given.
pub(crate) fn build_sweep(
    caps: &CapabilitySnapshot,
    types: &[ElementType],
    strides: &[u32],
) -> TransferSpecSweep {
    if types.is_empty() && strides.is_empty() {
        return TransferSpecSweep::new(caps);
    }
    let types = if types.is_empty() { &ElementType::ALL[..] } else { types };
    let strides = if strides.is_empty() { &SWEEP_STRIDES[..] } else { strides };
    TransferSpecSweep::restricted(caps, types, strides)
}
