//! Execution geometry planning.
//!
//! The planner narrows the work-group size and work-group count through a
//! sequence of clamps, one per hardware limit:
//!
//! 1. half of local memory must hold three copies per work item,
//! 2. the work-group may not exceed the device's first work-item dimension
//!    or the compiled kernel's work-group limit,
//! 3. all global buffers together may use at most half of global memory.

use serde::Serialize;
use strided_common::{ConformanceConfig, PlanError, TransferSpec};
use strided_device_probe::CapabilitySnapshot;

/// Elements each work item copies.
pub const COPIES_PER_WORK_ITEM: u64 = 3;

/// Tunables that bound the planner independently of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerLimits {
    /// Work-group count before memory clamping.
    pub target_workgroups: u64,
    /// Global memory is clamped to this value before planning.
    pub host_address_ceiling: u64,
}

impl PlannerLimits {
    /// Largest host-addressable byte count.
    pub fn host_pointer_max() -> u64 {
        u64::try_from(usize::MAX).unwrap_or(u64::MAX)
    }
}

impl Default for PlannerLimits {
    fn default() -> Self {
        Self {
            target_workgroups: strided_common::config::DEFAULT_TARGET_WORKGROUPS,
            host_address_ceiling: Self::host_pointer_max(),
        }
    }
}

impl From<&ConformanceConfig> for PlannerLimits {
    fn from(config: &ConformanceConfig) -> Self {
        Self {
            target_workgroups: config.target_workgroups,
            host_address_ceiling: config
                .host_address_ceiling
                .unwrap_or_else(Self::host_pointer_max),
        }
    }
}

/// Launch and buffer sizes for one transfer.
///
/// Only [`plan_geometry`] constructs this, so the invariants below always hold:
/// - `local_buffer_bytes <= local_memory_bytes / 2`
/// - `global_buffer_bytes * buffer_multiplier <= global_memory_bytes / 2`
/// - `global_work_size % local_workgroup_size == 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionGeometry {
    element_size_bytes: u64,
    copies_per_work_item: u64,
    local_workgroup_size: u64,
    local_buffer_bytes: u64,
    number_of_workgroups: u64,
    global_buffer_bytes: u64,
    global_work_size: u64,
    buffer_multiplier: u64,
}

impl ExecutionGeometry {
    pub const fn element_size_bytes(&self) -> u64 {
        self.element_size_bytes
    }

    pub const fn copies_per_work_item(&self) -> u64 {
        self.copies_per_work_item
    }

    pub const fn local_workgroup_size(&self) -> u64 {
        self.local_workgroup_size
    }

    /// Local memory reserved per work-group.
    pub const fn local_buffer_bytes(&self) -> u64 {
        self.local_buffer_bytes
    }

    pub const fn number_of_workgroups(&self) -> u64 {
        self.number_of_workgroups
    }

    /// Size of each of the source and destination buffers.
    pub const fn global_buffer_bytes(&self) -> u64 {
        self.global_buffer_bytes
    }

    pub const fn global_work_size(&self) -> u64 {
        self.global_work_size
    }

    /// Global buffers budgeted against device memory (2, or 4 when unified).
    pub const fn buffer_multiplier(&self) -> u64 {
        self.buffer_multiplier
    }

    /// Elements one work-group moves with a single async copy.
    pub const fn copies_per_workgroup(&self) -> u64 {
        self.copies_per_work_item * self.local_workgroup_size
    }

    /// Elements copied across the whole launch.
    pub const fn total_copies(&self) -> u64 {
        self.copies_per_work_item * self.global_work_size
    }
}

/// Plan the execution geometry of one transfer.
///
/// `kernel_max_work_group_size` is the work-group limit reported for the
/// compiled kernel, which may be lower than the device-wide limit.
pub fn plan_geometry(
    caps: &CapabilitySnapshot,
    spec: &TransferSpec,
    kernel_max_work_group_size: u64,
    limits: &PlannerLimits,
) -> Result<ExecutionGeometry, PlanError> {
    let element_size_bytes = spec.element_size_bytes();
    let local_storage_per_work_item = COPIES_PER_WORK_ITEM * element_size_bytes;

    // Half of local memory stays free for other kernel state.
    let max_local_workgroup_size = (caps.local_memory_bytes / 2) / local_storage_per_work_item;
    if max_local_workgroup_size == 0 {
        return Err(PlanError::resource_exhausted(format!(
            "{} B of local memory cannot hold {COPIES_PER_WORK_ITEM} copies of {} \
             ({local_storage_per_work_item} B per work item)",
            caps.local_memory_bytes,
            spec.type_name(),
        )));
    }

    let local_workgroup_size = max_local_workgroup_size
        .min(caps.max_work_item_sizes[0])
        .min(kernel_max_work_group_size);
    if local_workgroup_size == 0 {
        return Err(PlanError::resource_exhausted(format!(
            "zero work-group limit (device dim 0: {}, kernel: {kernel_max_work_group_size})",
            caps.max_work_item_sizes[0],
        )));
    }

    let local_buffer_bytes = local_workgroup_size * element_size_bytes * COPIES_PER_WORK_ITEM;

    // At most half of global memory across every buffer copy, so concurrent
    // allocations do not fail on a fragmented address space.
    let buffer_multiplier = caps.buffer_multiplier();
    let stride = u64::from(spec.stride());
    let global_memory_bytes = caps.global_memory_bytes.min(limits.host_address_ceiling);
    let bytes_per_workgroup = 2u64
        .saturating_mul(buffer_multiplier)
        .saturating_mul(local_buffer_bytes)
        .saturating_mul(stride);
    let workgroup_limit = global_memory_bytes / bytes_per_workgroup;
    let number_of_workgroups = limits.target_workgroups.min(workgroup_limit);
    if number_of_workgroups == 0 {
        return Err(PlanError::resource_exhausted(format!(
            "{global_memory_bytes} B of global memory cannot hold one work-group of {} \
             ({bytes_per_workgroup} B across {buffer_multiplier} buffers)",
            spec,
        )));
    }

    let geometry = ExecutionGeometry {
        element_size_bytes,
        copies_per_work_item: COPIES_PER_WORK_ITEM,
        local_workgroup_size,
        local_buffer_bytes,
        number_of_workgroups,
        global_buffer_bytes: number_of_workgroups * local_buffer_bytes * stride,
        global_work_size: number_of_workgroups * local_workgroup_size,
        buffer_multiplier,
    };

    tracing::debug!(
        spec = %spec,
        local_workgroup_size,
        local_buffer_bytes,
        number_of_workgroups,
        global_buffer_bytes = geometry.global_buffer_bytes,
        "planned execution geometry"
    );

    Ok(geometry)
}
