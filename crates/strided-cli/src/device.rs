//! Which device a command talks to.

use std::fmt;
use std::str::FromStr;

use strided_common::{ConformanceConfig, ProbeError};
use strided_device_probe::{CapabilityQuery, DeviceProfile, profile_from_env};

/// A built-in profile or the real OpenCL device named by the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelection {
    Profile(DeviceProfile),
    OpenCl,
}

impl Default for DeviceSelection {
    fn default() -> Self {
        Self::Profile(DeviceProfile::Mock)
    }
}

impl DeviceSelection {
    /// `--profile` if given, else `STRIDED_DEVICE_PROFILE`, else the mock profile.
    pub fn resolve(flag: Option<Self>) -> Result<Self, ProbeError> {
        if let Some(selection) = flag {
            return Ok(selection);
        }
        Ok(profile_from_env()?.map_or_else(Self::default, Self::Profile))
    }

    /// Capability query for this selection.
    pub fn open(self, config: &ConformanceConfig) -> Result<Box<dyn CapabilityQuery>, ProbeError> {
        match self {
            Self::Profile(profile) => Ok(Box::new(profile)),
            Self::OpenCl => open_opencl(config),
        }
    }
}

#[cfg(feature = "opencl")]
fn open_opencl(config: &ConformanceConfig) -> Result<Box<dyn CapabilityQuery>, ProbeError> {
    let device = strided_opencl::OpenClDevice::open(config.platform_index, config.device_index)?;
    Ok(Box::new(device))
}

#[cfg(not(feature = "opencl"))]
fn open_opencl(_config: &ConformanceConfig) -> Result<Box<dyn CapabilityQuery>, ProbeError> {
    Err(ProbeError::BackendUnavailable("opencl".to_string()))
}

impl fmt::Display for DeviceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(profile) => profile.fmt(f),
            Self::OpenCl => f.write_str("opencl"),
        }
    }
}

impl FromStr for DeviceSelection {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opencl" | "cl" => Ok(Self::OpenCl),
            other => other.parse().map(Self::Profile),
        }
    }
}
