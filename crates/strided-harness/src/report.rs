//! Sweep outcome records.

use serde::Serialize;
use strided_common::{CopyDirection, TransferSpec};
use strided_core::{ExecutionGeometry, Mismatch};

/// What happened to one sweep entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    Passed { windows_checked: usize },
    /// Verification found a mismatching window.
    Failed { mismatch: Mismatch },
    /// No geometry fits the device; not a failure.
    Skipped { reason: String },
    /// The executor or verifier could not complete the entry.
    ExecutionFailed { error: String },
}

impl EntryOutcome {
    /// Whether the entry counts against the sweep.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::ExecutionFailed { .. })
    }
}

/// Report for one transfer in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryReport {
    pub spec: TransferSpec,
    /// Planned geometry; absent when planning or compilation failed.
    pub geometry: Option<ExecutionGeometry>,
    pub outcome: EntryOutcome,
}

/// Tallies over a set of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    fn add(&mut self, outcome: &EntryOutcome) {
        self.total += 1;
        match outcome {
            EntryOutcome::Passed { .. } => self.passed += 1,
            EntryOutcome::Skipped { .. } => self.skipped += 1,
            EntryOutcome::Failed { .. } | EntryOutcome::ExecutionFailed { .. } => self.failed += 1,
        }
    }

    fn merge(&mut self, other: Self) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Every entry of one copy direction's sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectionReport {
    pub direction: CopyDirection,
    pub test_name: &'static str,
    pub entries: Vec<EntryReport>,
}

impl DirectionReport {
    pub fn new(direction: CopyDirection) -> Self {
        Self { direction, test_name: direction.test_name(), entries: Vec::new() }
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.entries {
            summary.add(&entry.outcome);
        }
        summary
    }

    /// A direction passes when no entry failed; skips do not count.
    pub fn success(&self) -> bool {
        !self.entries.iter().any(|e| e.outcome.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| e.outcome.is_failure())
    }
}

/// Complete run over one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub device: String,
    pub seed: u64,
    pub directions: Vec<DirectionReport>,
}

impl SweepReport {
    pub fn success(&self) -> bool {
        self.directions.iter().all(DirectionReport::success)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for direction in &self.directions {
            summary.merge(direction.summary());
        }
        summary
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strided_common::{ElementType, VectorWidth};

    fn entry(outcome: EntryOutcome) -> EntryReport {
        EntryReport {
            spec: TransferSpec::new(ElementType::Int, VectorWidth::Two, 3).unwrap(),
            geometry: None,
            outcome,
        }
    }

    #[test]
    fn skips_do_not_fail_a_direction() {
        let mut report = DirectionReport::new(CopyDirection::GlobalToLocal);
        report.entries.push(entry(EntryOutcome::Passed { windows_checked: 4 }));
        report.entries.push(entry(EntryOutcome::Skipped { reason: "too small".into() }));
        assert!(report.success());
        let summary = report.summary();
        assert_eq!((summary.total, summary.passed, summary.skipped, summary.failed), (2, 1, 1, 0));
    }

    #[test]
    fn execution_errors_fail_a_direction() {
        let mut report = DirectionReport::new(CopyDirection::LocalToGlobal);
        report.entries.push(entry(EntryOutcome::ExecutionFailed { error: "launch".into() }));
        assert!(!report.success());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.test_name, "async_strided_copy_local_to_global");
    }

    #[test]
    fn sweep_summary_merges_directions() {
        let mut a = DirectionReport::new(CopyDirection::GlobalToLocal);
        a.entries.push(entry(EntryOutcome::Passed { windows_checked: 1 }));
        let mut b = DirectionReport::new(CopyDirection::LocalToGlobal);
        b.entries.push(entry(EntryOutcome::Failed {
            mismatch: Mismatch { offset: 0, expected_bytes: vec![1], actual_bytes: vec![0] },
        }));
        let report = SweepReport { device: "d".into(), seed: 1, directions: vec![a, b] };
        assert!(!report.success());
        assert_eq!(report.summary(), Summary { total: 2, passed: 1, failed: 1, skipped: 0 });
    }
}
