//! Kernel execution collaborator.

use strided_common::{CopyDirection, ExecutionError, TransferSpec};

use crate::planner::ExecutionGeometry;

/// Compiles and runs the copy kernel for one transfer.
///
/// The orchestrator compiles first, queries the kernel's work-group limit,
/// plans a geometry against it, then runs once and verifies the result.
pub trait TransferExecutor {
    /// Compiled kernel handle.
    type Kernel;

    /// Build the copy kernel for `spec` in `direction`.
    fn compile(
        &self,
        spec: &TransferSpec,
        direction: CopyDirection,
    ) -> Result<Self::Kernel, ExecutionError>;

    /// Work-group limit of the compiled kernel on this device.
    fn max_work_group_size(&self, kernel: &Self::Kernel) -> Result<u64, ExecutionError>;

    /// Execute the kernel over `input` and return the destination buffer.
    ///
    /// `input` must be exactly `geometry.global_buffer_bytes()` long. The
    /// destination starts zeroed, so bytes the copy never writes read back
    /// as zero.
    fn run(
        &self,
        kernel: &Self::Kernel,
        geometry: &ExecutionGeometry,
        stride: u32,
        input: &[u8],
    ) -> Result<Vec<u8>, ExecutionError>;
}

/// Check that `input` matches the planned buffer size.
pub fn check_input_len(geometry: &ExecutionGeometry, input: &[u8]) -> Result<(), ExecutionError> {
    let actual = input.len() as u64;
    if actual == geometry.global_buffer_bytes() {
        Ok(())
    } else {
        Err(ExecutionError::InputSize { expected: geometry.global_buffer_bytes(), actual })
    }
}
