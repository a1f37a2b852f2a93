//! Capability queries against a real OpenCL device.

use opencl3::device::{CL_DEVICE_TYPE_ALL, Device};
use opencl3::error_codes::ClError;
use opencl3::platform::get_platforms;
use strided_common::ProbeError;
use strided_device_probe::{CapabilityQuery, CapabilitySnapshot};
use tracing::{debug, info};

fn query_failed(query: &'static str) -> impl Fn(ClError) -> ProbeError {
    move |e| ProbeError::QueryFailed { query, reason: e.to_string() }
}

fn has_extension(extensions: &str, name: &str) -> bool {
    extensions.split_whitespace().any(|ext| ext == name)
}

/// One entry of [`OpenClDevice::enumerate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceListing {
    pub platform_index: usize,
    pub device_index: usize,
    pub platform_name: String,
    pub device_name: String,
}

/// An OpenCL device selected by platform and device index.
#[derive(Debug)]
pub struct OpenClDevice {
    pub(crate) device: Device,
    platform_name: String,
    device_name: String,
}

impl OpenClDevice {
    /// Open device `device_index` of platform `platform_index`.
    pub fn open(platform_index: usize, device_index: usize) -> Result<Self, ProbeError> {
        let platforms = get_platforms().map_err(query_failed("CL_PLATFORMS"))?;
        if platforms.is_empty() {
            return Err(ProbeError::NoPlatforms);
        }
        let no_device = || ProbeError::NoDevice { platform_index, device_index };

        let platform = platforms.get(platform_index).ok_or_else(no_device)?;
        let platform_name = platform.name().unwrap_or_default();
        let device_ids = platform
            .get_devices(CL_DEVICE_TYPE_ALL)
            .map_err(query_failed("CL_DEVICES"))?;
        let device = Device::new(*device_ids.get(device_index).ok_or_else(no_device)?);
        let device_name = device.name().unwrap_or_default();

        info!(platform = %platform_name, device = %device_name, "opened OpenCL device");
        Ok(Self { device, platform_name, device_name })
    }

    /// Every device on every platform, in index order.
    pub fn enumerate() -> Result<Vec<DeviceListing>, ProbeError> {
        let platforms = get_platforms().map_err(query_failed("CL_PLATFORMS"))?;
        if platforms.is_empty() {
            return Err(ProbeError::NoPlatforms);
        }

        let mut listings = Vec::new();
        for (platform_index, platform) in platforms.iter().enumerate() {
            let platform_name = platform.name().unwrap_or_default();
            debug!("Scanning OpenCL platform: {}", platform_name);
            let device_ids = platform.get_devices(CL_DEVICE_TYPE_ALL).unwrap_or_default();
            for (device_index, id) in device_ids.into_iter().enumerate() {
                listings.push(DeviceListing {
                    platform_index,
                    device_index,
                    platform_name: platform_name.clone(),
                    device_name: Device::new(id).name().unwrap_or_default(),
                });
            }
        }
        Ok(listings)
    }

    pub fn name(&self) -> &str {
        &self.device_name
    }

    pub fn platform_name(&self) -> &str {
        &self.platform_name
    }
}

impl CapabilityQuery for OpenClDevice {
    fn query(&self) -> Result<CapabilitySnapshot, ProbeError> {
        let device = &self.device;
        let local_memory_bytes =
            device.local_mem_size().map_err(query_failed("CL_DEVICE_LOCAL_MEM_SIZE"))?;
        let global_memory_bytes =
            device.global_mem_size().map_err(query_failed("CL_DEVICE_GLOBAL_MEM_SIZE"))?;
        let max_work_group_size = device
            .max_work_group_size()
            .map_err(query_failed("CL_DEVICE_MAX_WORK_GROUP_SIZE"))?;
        let item_sizes = device
            .max_work_item_sizes()
            .map_err(query_failed("CL_DEVICE_MAX_WORK_ITEM_SIZES"))?;
        let host_unified_memory = device
            .host_unified_memory()
            .map_err(query_failed("CL_DEVICE_HOST_UNIFIED_MEMORY"))?;
        let extensions = device.extensions().map_err(query_failed("CL_DEVICE_EXTENSIONS"))?;
        let profile = device.profile().map_err(query_failed("CL_DEVICE_PROFILE"))?;
        let compute_units = device.max_compute_units().unwrap_or(0);

        let mut max_work_item_sizes = [1u64; 3];
        for (slot, size) in max_work_item_sizes.iter_mut().zip(item_sizes) {
            *slot = size as u64;
        }

        // Embedded profile devices only have 64-bit integers through an extension.
        let supports_64bit_int =
            profile.trim() == "FULL_PROFILE" || has_extension(&extensions, "cles_khr_int64");

        let snapshot = CapabilitySnapshot {
            name: self.device_name.clone(),
            compute_units,
            local_memory_bytes,
            global_memory_bytes,
            max_work_group_size: max_work_group_size as u64,
            max_work_item_sizes,
            host_unified_memory,
            supports_fp16: has_extension(&extensions, "cl_khr_fp16"),
            supports_fp64: has_extension(&extensions, "cl_khr_fp64"),
            supports_64bit_int,
        };
        debug!(device = %snapshot.name, ?snapshot, "queried device capabilities");
        Ok(snapshot)
    }
}
