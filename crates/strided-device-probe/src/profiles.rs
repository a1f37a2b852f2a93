//! Built-in device profiles for running without hardware.

use std::fmt;
use std::str::FromStr;

use strided_common::ProbeError;

use crate::CapabilitySnapshot;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Environment variable selecting a built-in profile.
pub const PROFILE_ENV: &str = "STRIDED_DEVICE_PROFILE";

/// Representative capability sets for common device classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceProfile {
    /// Mid-range discrete GPU with every optional type supported.
    Mock,
    /// Intel Arc (Xe-HPG): no FP64.
    IntelArc,
    /// NVIDIA SM-based GPU, 48 KB shared memory.
    Nvidia,
    /// AMD RDNA/CDNA GPU.
    Amd,
    /// Integrated embedded-profile GPU sharing memory with the host.
    Embedded,
}

impl DeviceProfile {
    pub const ALL: [Self; 5] = [Self::Mock, Self::IntelArc, Self::Nvidia, Self::Amd, Self::Embedded];

    /// Capability snapshot for the profile.
    pub fn snapshot(self) -> CapabilitySnapshot {
        match self {
            Self::Mock => CapabilitySnapshot {
                name: "Mock GPU Device".into(),
                compute_units: 32,
                local_memory_bytes: 64 * KIB,
                global_memory_bytes: 8 * GIB,
                max_work_group_size: 1024,
                max_work_item_sizes: [1024, 1024, 64],
                host_unified_memory: false,
                supports_fp16: true,
                supports_fp64: true,
                supports_64bit_int: true,
            },
            Self::IntelArc => CapabilitySnapshot {
                name: "Intel Arc A770 (profile)".into(),
                compute_units: 512,
                local_memory_bytes: 64 * KIB,
                global_memory_bytes: 16 * GIB,
                max_work_group_size: 1024,
                max_work_item_sizes: [1024, 1024, 64],
                host_unified_memory: false,
                supports_fp16: true,
                supports_fp64: false,
                supports_64bit_int: true,
            },
            Self::Nvidia => CapabilitySnapshot {
                name: "NVIDIA GPU (profile)".into(),
                compute_units: 128,
                local_memory_bytes: 48 * KIB,
                global_memory_bytes: 24 * GIB,
                max_work_group_size: 1024,
                max_work_item_sizes: [1024, 1024, 64],
                host_unified_memory: false,
                supports_fp16: true,
                supports_fp64: true,
                supports_64bit_int: true,
            },
            Self::Amd => CapabilitySnapshot {
                name: "AMD GPU (profile)".into(),
                compute_units: 120,
                local_memory_bytes: 64 * KIB,
                global_memory_bytes: 16 * GIB,
                max_work_group_size: 1024,
                max_work_item_sizes: [1024, 1024, 1024],
                host_unified_memory: false,
                supports_fp16: true,
                supports_fp64: true,
                supports_64bit_int: true,
            },
            Self::Embedded => CapabilitySnapshot {
                name: "Embedded iGPU (profile)".into(),
                compute_units: 4,
                local_memory_bytes: 32 * KIB,
                global_memory_bytes: 512 * MIB,
                max_work_group_size: 256,
                max_work_item_sizes: [256, 256, 256],
                host_unified_memory: true,
                supports_fp16: true,
                supports_fp64: false,
                supports_64bit_int: false,
            },
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::IntelArc => write!(f, "intel-arc"),
            Self::Nvidia => write!(f, "nvidia"),
            Self::Amd => write!(f, "amd"),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

impl FromStr for DeviceProfile {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "intel-arc" | "intel" | "arc" => Ok(Self::IntelArc),
            "nvidia" => Ok(Self::Nvidia),
            "amd" => Ok(Self::Amd),
            "embedded" | "igpu" => Ok(Self::Embedded),
            other => Err(ProbeError::UnknownProfile(other.to_string())),
        }
    }
}

/// Read `STRIDED_DEVICE_PROFILE`.
///
/// Returns `Ok(None)` when the variable is unset or empty.
pub fn profile_from_env() -> Result<Option<DeviceProfile>, ProbeError> {
    match std::env::var(PROFILE_ENV) {
        Ok(value) if !value.trim().is_empty() => value.parse().map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_profile_round_trips_through_display() {
        for profile in DeviceProfile::ALL {
            assert_eq!(profile.to_string().parse::<DeviceProfile>().unwrap(), profile);
        }
    }

    #[test]
    fn embedded_profile_is_unified_and_lacks_int64() {
        let caps = DeviceProfile::Embedded.snapshot();
        assert!(caps.host_unified_memory);
        assert!(!caps.supports_64bit_int);
        assert_eq!(caps.buffer_multiplier(), 4);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let err = "quantum".parse::<DeviceProfile>().unwrap_err();
        assert_eq!(err, ProbeError::UnknownProfile("quantum".into()));
    }
}
