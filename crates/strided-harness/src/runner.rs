//! Sweep orchestration.
//!
//! For every transfer spec the runner compiles the kernel, plans a geometry
//! against the kernel's work-group limit, generates input, executes and
//! verifies. Entry-level problems are recorded and the sweep moves on; only a
//! failed capability query aborts the run.

use strided_common::{ConformanceConfig, CopyDirection, ProbeError, TransferSpec};
use strided_core::{
    ExecutionGeometry, PlannerLimits, TransferExecutor, TransferSpecSweep, plan_geometry, verify,
};
use strided_device_probe::{CapabilityQuery, CapabilitySnapshot};
use tracing::{error, info, warn};

use crate::data::InputGenerator;
use crate::report::{DirectionReport, EntryOutcome, EntryReport, SweepReport};

/// Knobs for one conformance run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub limits: PlannerLimits,
    pub seed: u64,
    pub directions: Vec<CopyDirection>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&ConformanceConfig::default())
    }
}

impl From<&ConformanceConfig> for RunOptions {
    fn from(config: &ConformanceConfig) -> Self {
        Self {
            limits: PlannerLimits::from(config),
            seed: config.seed,
            directions: config.direction.directions(),
        }
    }
}

/// Drives sweeps for one device through one executor.
#[derive(Debug)]
pub struct ConformanceRunner<'a, E> {
    executor: &'a E,
    caps: CapabilitySnapshot,
    options: RunOptions,
}

impl<'a, E: TransferExecutor> ConformanceRunner<'a, E> {
    /// Query the device once. A query failure is fatal for the whole run.
    pub fn new(
        query: &(impl CapabilityQuery + ?Sized),
        executor: &'a E,
        options: RunOptions,
    ) -> Result<Self, ProbeError> {
        let caps = query.query()?;
        info!(device = %caps.name, "device capabilities acquired");
        Ok(Self { executor, caps, options })
    }

    pub fn capabilities(&self) -> &CapabilitySnapshot {
        &self.caps
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// The full sweep for this device.
    pub fn sweep(&self) -> TransferSpecSweep {
        TransferSpecSweep::new(&self.caps)
    }

    /// Run `sweep` once per configured direction.
    pub fn run(&self, sweep: &TransferSpecSweep) -> SweepReport {
        let directions =
            self.options.directions.iter().map(|d| self.run_direction(*d, sweep)).collect();
        SweepReport { device: self.caps.name.clone(), seed: self.options.seed, directions }
    }

    /// Run every entry of `sweep` in one direction.
    pub fn run_direction(&self, direction: CopyDirection, sweep: &TransferSpecSweep) -> DirectionReport {
        let mut report = DirectionReport::new(direction);
        let mut sweep = sweep.clone();
        sweep.restart();

        info!(test = direction.test_name(), entries = sweep.len(), "starting sweep");
        for spec in sweep {
            report.entries.push(self.run_entry(&spec, direction));
        }

        let summary = report.summary();
        info!(
            test = direction.test_name(),
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "sweep finished"
        );
        report
    }

    /// Compile, plan, execute and verify one transfer.
    ///
    /// Input data is generated from the run seed alone, so an entry sees the
    /// same bytes whichever sweep it is part of.
    pub fn run_entry(&self, spec: &TransferSpec, direction: CopyDirection) -> EntryReport {
        info!("Testing {}", spec.type_name());
        let failed = |error: String, geometry: Option<ExecutionGeometry>| {
            error!(spec = %spec, %direction, "{error}");
            EntryReport { spec: *spec, geometry, outcome: EntryOutcome::ExecutionFailed { error } }
        };

        let kernel = match self.executor.compile(spec, direction) {
            Ok(kernel) => kernel,
            Err(e) => return failed(e.to_string(), None),
        };
        let kernel_limit = match self.executor.max_work_group_size(&kernel) {
            Ok(limit) => limit,
            Err(e) => return failed(e.to_string(), None),
        };

        let geometry = match plan_geometry(&self.caps, spec, kernel_limit, &self.options.limits) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!(spec = %spec, "skipping: {e}");
                return EntryReport {
                    spec: *spec,
                    geometry: None,
                    outcome: EntryOutcome::Skipped { reason: e.to_string() },
                };
            }
        };

        info!(
            "Global: {}, local {}, local buffer {}b, global buffer {}b, copy stride {}, \
             each work group will copy {} elements and each work item will copy {} elements.",
            geometry.global_work_size(),
            geometry.local_workgroup_size(),
            geometry.local_buffer_bytes(),
            geometry.global_buffer_bytes(),
            spec.stride(),
            geometry.copies_per_workgroup(),
            geometry.copies_per_work_item(),
        );

        let Ok(len) = usize::try_from(geometry.global_buffer_bytes()) else {
            return failed(
                format!("global buffer of {} B is not addressable", geometry.global_buffer_bytes()),
                Some(geometry),
            );
        };
        let input = InputGenerator::new(self.options.seed).generate(spec.element_type(), len);

        let output = match self.executor.run(&kernel, &geometry, spec.stride(), &input) {
            Ok(output) => output,
            Err(e) => return failed(e.to_string(), Some(geometry)),
        };

        let outcome = match verify(&input, &output, spec, &geometry) {
            Ok(result) => match result.mismatch {
                None => EntryOutcome::Passed { windows_checked: result.windows_checked },
                Some(mismatch) => {
                    error!("Results of copy did not validate!");
                    error!("{mismatch}");
                    EntryOutcome::Failed { mismatch }
                }
            },
            Err(e) => return failed(e.to_string(), Some(geometry)),
        };

        EntryReport { spec: *spec, geometry: Some(geometry), outcome }
    }
}
