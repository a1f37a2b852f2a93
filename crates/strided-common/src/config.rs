//! Conformance run configuration.
//!
//! Loads [`ConformanceConfig`] from a TOML file (`strided.toml`) with
//! environment variable overrides via `STRIDED_*` prefixed variables.
//! Missing TOML keys fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::CopyDirection;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "strided.toml";

/// Default number of work-groups the planner starts from before clamping.
pub const DEFAULT_TARGET_WORKGROUPS: u64 = 579;

/// Default seed for input data generation.
pub const DEFAULT_SEED: u64 = 0x5EED;

/// Which copy directions a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionSelection {
    GlobalToLocal,
    LocalToGlobal,
    Both,
}

impl DirectionSelection {
    /// Directions in execution order.
    pub fn directions(self) -> Vec<CopyDirection> {
        match self {
            Self::GlobalToLocal => vec![CopyDirection::GlobalToLocal],
            Self::LocalToGlobal => vec![CopyDirection::LocalToGlobal],
            Self::Both => CopyDirection::ALL.to_vec(),
        }
    }
}

impl std::fmt::Display for DirectionSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GlobalToLocal => write!(f, "global-to-local"),
            Self::LocalToGlobal => write!(f, "local-to-global"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for DirectionSelection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" | "all" => Ok(Self::Both),
            other => other.parse::<CopyDirection>().map(|dir| match dir {
                CopyDirection::GlobalToLocal => Self::GlobalToLocal,
                CopyDirection::LocalToGlobal => Self::LocalToGlobal,
            }),
        }
    }
}

/// Execution collaborator used to run the copy kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Host reference executor; no device required.
    Reference,
    /// Real OpenCL device (requires the `opencl` feature).
    OpenCl,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::OpenCl => write!(f, "opencl"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reference" | "host" => Ok(Self::Reference),
            "opencl" => Ok(Self::OpenCl),
            other => Err(format!("unknown backend: {other}")),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Logging settings consumed by the CLI subscriber setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `strided_core=debug`.
    /// Override: `STRIDED_LOG_LEVEL`
    pub level: String,
    /// Override: `STRIDED_LOG_FORMAT`
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

/// Configuration of a conformance run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceConfig {
    /// Seed for input data generation.
    /// Override: `STRIDED_SEED`
    pub seed: u64,

    /// Work-group count the planner starts from before memory clamping.
    /// Override: `STRIDED_TARGET_WORKGROUPS`
    pub target_workgroups: u64,

    /// Ceiling applied to the device global memory size before planning.
    /// `None` uses the host pointer width maximum.
    /// Override: `STRIDED_HOST_ADDRESS_CEILING`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_address_ceiling: Option<u64>,

    /// Override: `STRIDED_DIRECTION`
    pub direction: DirectionSelection,

    /// Override: `STRIDED_BACKEND`
    pub backend: Backend,

    /// Zero-based OpenCL platform index.
    /// Override: `STRIDED_PLATFORM_INDEX`
    pub platform_index: usize,

    /// Zero-based device index within the platform.
    /// Override: `STRIDED_DEVICE_INDEX`
    pub device_index: usize,

    /// Kernel work-group limit reported by the host reference executor.
    /// Override: `STRIDED_REFERENCE_WG_LIMIT`
    pub reference_work_group_limit: u64,

    pub logging: LoggingConfig,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            target_workgroups: DEFAULT_TARGET_WORKGROUPS,
            host_address_ceiling: None,
            direction: DirectionSelection::Both,
            backend: Backend::Reference,
            platform_index: 0,
            device_index: 0,
            reference_work_group_limit: 1024,
            logging: LoggingConfig::default(),
        }
    }
}

/// Errors that can occur when loading or validating a [`ConformanceConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid environment override {key}={value}: {reason}")]
    EnvOverride { key: String, value: String, reason: String },
}

impl ConformanceConfig {
    /// Path from `STRIDED_CONFIG`, or `strided.toml` in the working directory.
    pub fn default_config_path() -> PathBuf {
        std::env::var_os("STRIDED_CONFIG")
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
    }

    /// Render the default configuration as TOML.
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut cfg: Self = toml::from_str(toml_str)?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load only from environment variables, starting from defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize the effective configuration.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_workgroups == 0 {
            return Err(ConfigError::Validation("target_workgroups must be > 0".into()));
        }
        if self.host_address_ceiling == Some(0) {
            return Err(ConfigError::Validation("host_address_ceiling must be > 0".into()));
        }
        if self.reference_work_group_limit == 0 {
            return Err(ConfigError::Validation("reference_work_group_limit must be > 0".into()));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("logging.level must not be empty".into()));
        }
        Ok(())
    }

    /// Apply `STRIDED_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(seed) = env_parse::<u64>("STRIDED_SEED")? {
            self.seed = seed;
        }
        if let Some(target) = env_parse::<u64>("STRIDED_TARGET_WORKGROUPS")? {
            self.target_workgroups = target;
        }
        if let Some(ceiling) = env_parse::<u64>("STRIDED_HOST_ADDRESS_CEILING")? {
            self.host_address_ceiling = Some(ceiling);
        }
        if let Some(direction) = env_parse::<DirectionSelection>("STRIDED_DIRECTION")? {
            self.direction = direction;
        }
        if let Some(backend) = env_parse::<Backend>("STRIDED_BACKEND")? {
            self.backend = backend;
        }
        if let Some(index) = env_parse::<usize>("STRIDED_PLATFORM_INDEX")? {
            self.platform_index = index;
        }
        if let Some(index) = env_parse::<usize>("STRIDED_DEVICE_INDEX")? {
            self.device_index = index;
        }
        if let Some(limit) = env_parse::<u64>("STRIDED_REFERENCE_WG_LIMIT")? {
            self.reference_work_group_limit = limit;
        }
        if let Ok(level) = std::env::var("STRIDED_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = env_parse::<LogFormat>("STRIDED_LOG_FORMAT")? {
            self.logging.format = format;
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(value) = std::env::var(key) else {
        return Ok(None);
    };
    value.trim().parse::<T>().map(Some).map_err(|e| ConfigError::EnvOverride {
        key: key.to_string(),
        value: value.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 10] = [
        "STRIDED_SEED",
        "STRIDED_TARGET_WORKGROUPS",
        "STRIDED_HOST_ADDRESS_CEILING",
        "STRIDED_DIRECTION",
        "STRIDED_BACKEND",
        "STRIDED_PLATFORM_INDEX",
        "STRIDED_DEVICE_INDEX",
        "STRIDED_REFERENCE_WG_LIMIT",
        "STRIDED_LOG_LEVEL",
        "STRIDED_LOG_FORMAT",
    ];

    fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
        ALL_VARS.iter().map(|k| (*k, None)).collect()
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = ConformanceConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.target_workgroups, 579);
        assert_eq!(cfg.direction, DirectionSelection::Both);
    }

    #[test]
    #[serial(strided_env)]
    fn default_toml_round_trips() {
        temp_env::with_vars(cleared(), || {
            let toml_str = ConformanceConfig::default_toml().unwrap();
            let cfg = ConformanceConfig::from_toml(&toml_str).unwrap();
            assert_eq!(cfg, ConformanceConfig::default());
        });
    }

    #[test]
    #[serial(strided_env)]
    fn partial_toml_keeps_defaults() {
        temp_env::with_vars(cleared(), || {
            let cfg = ConformanceConfig::from_toml(
                r#"
seed = 42
direction = "local-to-global"

[logging]
format = "json"
"#,
            )
            .unwrap();
            assert_eq!(cfg.seed, 42);
            assert_eq!(cfg.direction, DirectionSelection::LocalToGlobal);
            assert_eq!(cfg.logging.format, LogFormat::Json);
            assert_eq!(cfg.logging.level, "info");
            assert_eq!(cfg.target_workgroups, DEFAULT_TARGET_WORKGROUPS);
        });
    }

    #[test]
    fn zero_target_workgroups_rejected() {
        let cfg = ConformanceConfig { target_workgroups: 0, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("target_workgroups must be > 0"));
    }

    #[test]
    fn zero_ceiling_rejected() {
        let cfg = ConformanceConfig { host_address_ceiling: Some(0), ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    #[serial(strided_env)]
    fn env_overrides_apply() {
        let mut vars = cleared();
        vars.retain(|(k, _)| {
            !matches!(*k, "STRIDED_SEED" | "STRIDED_BACKEND" | "STRIDED_HOST_ADDRESS_CEILING")
        });
        vars.push(("STRIDED_SEED", Some("7")));
        vars.push(("STRIDED_BACKEND", Some("opencl")));
        vars.push(("STRIDED_HOST_ADDRESS_CEILING", Some("4294967295")));
        temp_env::with_vars(vars, || {
            let cfg = ConformanceConfig::from_env().unwrap();
            assert_eq!(cfg.seed, 7);
            assert_eq!(cfg.backend, Backend::OpenCl);
            assert_eq!(cfg.host_address_ceiling, Some(u64::from(u32::MAX)));
        });
    }

    #[test]
    #[serial(strided_env)]
    fn bad_env_override_names_the_key() {
        let mut vars = cleared();
        vars.retain(|(k, _)| *k != "STRIDED_DIRECTION");
        vars.push(("STRIDED_DIRECTION", Some("sideways")));
        temp_env::with_vars(vars, || {
            let err = ConformanceConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::EnvOverride { ref key, .. } if key == "STRIDED_DIRECTION"));
        });
    }

    #[test]
    fn direction_selection_expands() {
        assert_eq!(DirectionSelection::Both.directions(), CopyDirection::ALL.to_vec());
        assert_eq!(
            DirectionSelection::LocalToGlobal.directions(),
            vec![CopyDirection::LocalToGlobal]
        );
    }
}
