//! Device capability snapshots for strided copy conformance.
//!
//! A [`CapabilitySnapshot`] is the read-only record of device limits that the
//! geometry planner and the transfer sweep consume. Snapshots come from a
//! [`CapabilityQuery`] collaborator: a fixed [`StaticQuery`], one of the
//! built-in [`DeviceProfile`] presets, or a real device probe provided by the
//! `strided-opencl` crate.
//!
//! `STRIDED_DEVICE_PROFILE` selects a preset for deterministic testing
//! without hardware (see [`profile_from_env`]).

mod profiles;

use std::fmt;

use serde::Serialize;
use strided_common::{ElementType, ProbeError};

pub use profiles::{DeviceProfile, PROFILE_ENV, profile_from_env};

// ── CapabilitySnapshot ───────────────────────────────────────────────────────

/// Device limits relevant to sizing a strided copy test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct CapabilitySnapshot {
    /// Human-readable device name.
    pub name: String,
    /// Number of compute units (informational).
    pub compute_units: u32,
    /// Per-work-group local memory in bytes.
    pub local_memory_bytes: u64,
    /// Total global memory in bytes.
    pub global_memory_bytes: u64,
    /// Device-wide maximum work-group size.
    pub max_work_group_size: u64,
    /// Maximum work-item count per dimension `[x, y, z]`.
    pub max_work_item_sizes: [u64; 3],
    /// Host and device share physical memory.
    pub host_unified_memory: bool,
    /// `cl_khr_fp16` is available.
    pub supports_fp16: bool,
    /// `cl_khr_fp64` is available.
    pub supports_fp64: bool,
    /// 64-bit integer types are available.
    pub supports_64bit_int: bool,
}

impl CapabilitySnapshot {
    /// Number of global buffers budgeted per transfer.
    ///
    /// Unified-memory devices may keep a host and a device copy of each of
    /// the two buffers, so four are budgeted instead of two.
    pub const fn buffer_multiplier(&self) -> u64 {
        if self.host_unified_memory { 4 } else { 2 }
    }
}

/// Capability predicate consulted by the transfer sweep.
pub trait TypeSupport {
    /// Whether transfers of `element_type` can run on the device.
    fn supports(&self, element_type: ElementType) -> bool;
}

impl TypeSupport for CapabilitySnapshot {
    fn supports(&self, element_type: ElementType) -> bool {
        match element_type {
            ty if ty.is_64bit_int() => self.supports_64bit_int,
            ElementType::Half => self.supports_fp16,
            ElementType::Double => self.supports_fp64,
            _ => true,
        }
    }
}

// ── CapabilityQuery ──────────────────────────────────────────────────────────

/// Collaborator that produces a [`CapabilitySnapshot`] for one device.
///
/// Called once per device before any sweep. An error is fatal to the sweep.
pub trait CapabilityQuery {
    fn query(&self) -> Result<CapabilitySnapshot, ProbeError>;
}

/// A query that always answers with the same snapshot.
#[derive(Debug, Clone)]
pub struct StaticQuery(pub CapabilitySnapshot);

impl CapabilityQuery for StaticQuery {
    fn query(&self) -> Result<CapabilitySnapshot, ProbeError> {
        Ok(self.0.clone())
    }
}

impl CapabilityQuery for DeviceProfile {
    fn query(&self) -> Result<CapabilitySnapshot, ProbeError> {
        tracing::debug!(profile = %self, "using built-in device profile");
        Ok(self.snapshot())
    }
}

// ── Formatting ───────────────────────────────────────────────────────────────

/// Format a byte count into a human-readable string.
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const GB: u64 = 1024 * 1024 * 1024;
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Produce a human-readable summary of a snapshot.
pub fn format_device_info(caps: &CapabilitySnapshot) -> String {
    let lines = [
        format!("Device:          {}", caps.name),
        format!("Compute units:   {}", caps.compute_units),
        format!("Global memory:   {}", format_bytes(caps.global_memory_bytes)),
        format!("Local memory:    {}", format_bytes(caps.local_memory_bytes)),
        format!("Max workgroup:   {}", caps.max_work_group_size),
        format!("Max item sizes:  {:?}", caps.max_work_item_sizes),
        format!("Unified memory:  {}", caps.host_unified_memory),
        format!("FP16:            {}", caps.supports_fp16),
        format!("FP64:            {}", caps.supports_fp64),
        format!("64-bit integers: {}", caps.supports_64bit_int),
    ];
    lines.join("\n")
}

impl fmt::Display for CapabilitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_device_info(self))
    }
}
