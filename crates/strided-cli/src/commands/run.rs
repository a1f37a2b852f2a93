//! `strided run`: execute sweeps and report the outcome.

use anyhow::{Context, Result};
use clap::Args;
use strided_common::{Backend, ConformanceConfig, DirectionSelection, ElementType};
use strided_core::TransferExecutor;
use strided_device_probe::CapabilityQuery;
use strided_harness::{ConformanceRunner, ReferenceExecutor, RunOptions, SweepReport};
use tracing::{info, warn};

use super::build_sweep;
use crate::device::DeviceSelection;
use crate::exit::{EXIT_CONFORMANCE_FAIL, EXIT_SUCCESS};
use crate::render::format_summary;
use crate::session::Session;

/// Run the strided copy sweep in one or both directions.
#[derive(Args, Debug, Clone, Default)]
pub struct RunCommand {
    /// Copy direction to test: global-to-local, local-to-global or both
    #[arg(long, value_name = "DIRECTION")]
    pub direction: Option<DirectionSelection>,

    /// Execution backend: reference or opencl
    #[arg(long, value_name = "BACKEND")]
    pub backend: Option<Backend>,

    /// Only test these element types (comma separated)
    #[arg(long = "type", value_name = "TYPE", value_delimiter = ',')]
    pub types: Vec<ElementType>,

    /// Only test these strides (comma separated)
    #[arg(long = "stride", value_name = "STRIDE", value_delimiter = ',')]
    pub strides: Vec<u32>,

    /// Seed for input generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    pub fn execute(&self, session: &Session) -> Result<i32> {
        let report = self.report(session)?;
        if self.json {
            println!("{}", report.to_json().context("Failed to serialize report")?);
        } else {
            println!("{}", format_summary(&report));
        }
        Ok(if report.success() { EXIT_SUCCESS } else { EXIT_CONFORMANCE_FAIL })
    }

    /// Run the requested sweeps without printing anything.
    pub fn report(&self, session: &Session) -> Result<SweepReport> {
        let config = self.effective_config(&session.config);
        match config.backend {
            Backend::Reference => {
                let query = session.device.open(&config)?;
                let executor = ReferenceExecutor::new(config.reference_work_group_limit);
                self.sweep_with(&*query, &executor, &config)
            }
            Backend::OpenCl => {
                if session.device != DeviceSelection::OpenCl {
                    warn!(profile = %session.device, "opencl backend ignores the device profile");
                }
                run_opencl(self, &config)
            }
        }
    }

    fn effective_config(&self, base: &ConformanceConfig) -> ConformanceConfig {
        let mut config = base.clone();
        if let Some(direction) = self.direction {
            config.direction = direction;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }

    fn sweep_with<E: TransferExecutor>(
        &self,
        query: &dyn CapabilityQuery,
        executor: &E,
        config: &ConformanceConfig,
    ) -> Result<SweepReport> {
        let runner = ConformanceRunner::new(query, executor, RunOptions::from(config))?;
        let sweep = build_sweep(runner.capabilities(), &self.types, &self.strides);
        info!(
            entries = sweep.len(),
            directions = runner.options().directions.len(),
            backend = %config.backend,
            "running sweep"
        );
        Ok(runner.run(&sweep))
    }
}

#[cfg(feature = "opencl")]
fn run_opencl(cmd: &RunCommand, config: &ConformanceConfig) -> Result<SweepReport> {
    use strided_opencl::{OpenClDevice, OpenClExecutor};

    let device = OpenClDevice::open(config.platform_index, config.device_index)?;
    let executor = OpenClExecutor::new(&device)?;
    info!(platform = device.platform_name(), device = device.name(), "opened OpenCL device");
    cmd.sweep_with(&device, &executor, config)
}

#[cfg(not(feature = "opencl"))]
fn run_opencl(_cmd: &RunCommand, _config: &ConformanceConfig) -> Result<SweepReport> {
    Err(strided_common::ProbeError::BackendUnavailable("opencl".to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strided_device_probe::DeviceProfile;

    fn session(profile: DeviceProfile) -> Session {
        Session { config: ConformanceConfig::default(), device: DeviceSelection::Profile(profile) }
    }

    #[test]
    fn restricted_reference_run_passes() {
        let cmd = RunCommand {
            types: vec![ElementType::Short],
            strides: vec![1, 4],
            ..RunCommand::default()
        };
        let report = cmd.report(&session(DeviceProfile::Embedded)).unwrap();
        assert!(report.success());
        assert_eq!(report.directions.len(), 2);
        assert_eq!(report.summary().total, 2 * 6 * 2);
    }

    #[test]
    fn flags_override_config() {
        let cmd = RunCommand {
            direction: Some(DirectionSelection::LocalToGlobal),
            seed: Some(99),
            types: vec![ElementType::UChar],
            strides: vec![3],
            ..RunCommand::default()
        };
        let report = cmd.report(&session(DeviceProfile::Mock)).unwrap();
        assert_eq!(report.seed, 99);
        assert_eq!(report.directions.len(), 1);
        assert_eq!(report.directions[0].test_name, "async_strided_copy_local_to_global");
    }

    #[cfg(not(feature = "opencl"))]
    #[test]
    fn opencl_backend_unavailable_without_feature() {
        let cmd = RunCommand { backend: Some(Backend::OpenCl), ..RunCommand::default() };
        let err = cmd.report(&session(DeviceProfile::Mock)).unwrap_err();
        assert_eq!(crate::exit::exit_code_for(&err), crate::exit::EXIT_DEVICE_FAIL);
    }
}
