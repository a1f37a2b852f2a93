//! Human-readable output.

use console::style;
use strided_common::TransferSpec;
use strided_core::ExecutionGeometry;
use strided_harness::{EntryOutcome, EntryReport, SweepReport};

/// Planned geometry as aligned `key: value` lines.
pub fn format_geometry(spec: &TransferSpec, geometry: &ExecutionGeometry) -> String {
    let lines = [
        format!("Transfer:          {spec}"),
        format!("Element size:      {} B", geometry.element_size_bytes()),
        format!("Local size:        {}", geometry.local_workgroup_size()),
        format!("Local buffer:      {} B", geometry.local_buffer_bytes()),
        format!("Work-groups:       {}", geometry.number_of_workgroups()),
        format!("Global work size:  {}", geometry.global_work_size()),
        format!("Global buffer:     {} B", geometry.global_buffer_bytes()),
        format!("Buffer multiplier: {}", geometry.buffer_multiplier()),
        format!("Copies/work-group: {}", geometry.copies_per_workgroup()),
    ];
    lines.join("\n")
}

fn failure_reason(entry: &EntryReport) -> Option<String> {
    match &entry.outcome {
        EntryOutcome::Failed { mismatch } => Some(format!("mismatch at {mismatch}")),
        EntryOutcome::ExecutionFailed { error } => Some(error.clone()),
        EntryOutcome::Passed { .. } | EntryOutcome::Skipped { .. } => None,
    }
}

/// Per-direction tallies, failing entries and an overall verdict.
pub fn format_summary(report: &SweepReport) -> String {
    let mut lines = vec![format!(
        "{} {} (seed {})",
        style("Strided copy conformance on").bold(),
        style(&report.device).bold().cyan(),
        report.seed
    )];

    for direction in &report.directions {
        let summary = direction.summary();
        let verdict = if direction.success() {
            style("PASS").green().bold()
        } else {
            style("FAIL").red().bold()
        };
        lines.push(format!(
            "  {:<30} {verdict}  {} passed, {} failed, {} skipped",
            direction.test_name, summary.passed, summary.failed, summary.skipped
        ));
        lines.extend(direction.failures().filter_map(|entry| {
            failure_reason(entry).map(|reason| format!("    {}: {reason}", entry.spec))
        }));
    }

    let total = report.summary();
    let verdict = if report.success() { style("PASSED").green() } else { style("FAILED").red() };
    lines.push(format!(
        "{} {} of {} entries passed, {} skipped",
        verdict.bold(),
        total.passed,
        total.total,
        total.skipped
    ));
    lines.join("\n")
}
