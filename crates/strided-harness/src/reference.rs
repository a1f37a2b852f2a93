//! Host reference executor.
//!
//! Models what a conforming device must do for both copy directions, one
//! work-group at a time, including the local-memory staging step. Faults can
//! be injected to prove that the verifier and the orchestrator catch broken
//! copies.

use strided_common::{CopyDirection, ExecutionError, TransferSpec};
use strided_core::{ExecutionGeometry, TransferExecutor, check_input_len};

/// Work-group limit reported for reference kernels unless configured.
pub const DEFAULT_REFERENCE_WORK_GROUP_LIMIT: u64 = 1024;

/// A deliberate defect applied to the destination buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Invert every bit of the byte at `offset` after the copy.
    FlipByte { offset: usize },
    /// Never write copied element `index` (counted across the whole launch).
    DropElement { index: u64 },
}

/// "Compiled" reference kernel: the transfer it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceKernel {
    pub spec: TransferSpec,
    pub direction: CopyDirection,
}

/// [`TransferExecutor`] that runs on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceExecutor {
    work_group_limit: u64,
    faults: Vec<Fault>,
}

impl Default for ReferenceExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_WORK_GROUP_LIMIT)
    }
}

impl ReferenceExecutor {
    pub fn new(work_group_limit: u64) -> Self {
        Self { work_group_limit, faults: Vec::new() }
    }

    #[must_use]
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    fn drops(&self, index: u64) -> bool {
        self.faults.contains(&Fault::DropElement { index })
    }
}

/// Byte layout of one launch, in host units.
struct Layout {
    element: usize,
    stride: usize,
    copies_per_workgroup: usize,
    copies_per_work_item: usize,
    workgroups: usize,
}

impl Layout {
    fn new(geometry: &ExecutionGeometry, stride: u32) -> Result<Self, ExecutionError> {
        let cast = |value: u64, what: &str| {
            usize::try_from(value)
                .map_err(|_| ExecutionError::LaunchFailed(format!("{what} {value} exceeds usize")))
        };
        Ok(Self {
            element: cast(geometry.element_size_bytes(), "element size")?,
            stride: cast(u64::from(stride), "stride")?,
            copies_per_workgroup: cast(geometry.copies_per_workgroup(), "copies per work-group")?,
            copies_per_work_item: cast(geometry.copies_per_work_item(), "copies per work item")?,
            workgroups: cast(geometry.number_of_workgroups(), "work-group count")?,
        })
    }

    /// Byte offset in a global buffer of element `index` of `group`'s slice.
    const fn global_offset(&self, group: usize, index: usize) -> usize {
        (group * self.copies_per_workgroup + index) * self.stride * self.element
    }

    fn element_at<'a>(&self, buffer: &'a [u8], offset: usize) -> &'a [u8] {
        &buffer[offset..offset + self.element]
    }
}

impl TransferExecutor for ReferenceExecutor {
    type Kernel = ReferenceKernel;

    fn compile(
        &self,
        spec: &TransferSpec,
        direction: CopyDirection,
    ) -> Result<Self::Kernel, ExecutionError> {
        Ok(ReferenceKernel { spec: *spec, direction })
    }

    fn max_work_group_size(&self, _kernel: &Self::Kernel) -> Result<u64, ExecutionError> {
        Ok(self.work_group_limit)
    }

    fn run(
        &self,
        kernel: &Self::Kernel,
        geometry: &ExecutionGeometry,
        stride: u32,
        input: &[u8],
    ) -> Result<Vec<u8>, ExecutionError> {
        check_input_len(geometry, input)?;
        let layout = Layout::new(geometry, stride)?;
        let mut output = vec![0u8; input.len()];
        let mut local = vec![0u8; layout.copies_per_workgroup * layout.element];

        for group in 0..layout.workgroups {
            local.fill(0);
            // Both directions stage through local memory; only who performs
            // the strided side of the copy differs.
            for slot in 0..layout.copies_per_workgroup {
                let src = layout.element_at(input, layout.global_offset(group, slot));
                local[slot * layout.element..(slot + 1) * layout.element].copy_from_slice(src);
            }
            let work_items = layout.copies_per_workgroup / layout.copies_per_work_item.max(1);
            let mut slot = 0;
            for _work_item in 0..work_items {
                for _copy in 0..layout.copies_per_work_item {
                    let index = (group * layout.copies_per_workgroup + slot) as u64;
                    if !self.drops(index) {
                        let dst = layout.global_offset(group, slot);
                        output[dst..dst + layout.element].copy_from_slice(
                            &local[slot * layout.element..(slot + 1) * layout.element],
                        );
                    }
                    slot += 1;
                }
            }
        }

        for fault in &self.faults {
            if let Fault::FlipByte { offset } = *fault {
                if let Some(byte) = output.get_mut(offset) {
                    *byte ^= 0xFF;
                }
            }
        }

        tracing::trace!(
            direction = %kernel.direction,
            spec = %kernel.spec,
            bytes = output.len(),
            "reference copy complete"
        );
        Ok(output)
    }
}
