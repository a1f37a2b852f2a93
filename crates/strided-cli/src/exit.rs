// Exit codes for precise CI triage
use strided_common::{ConfigError, ProbeError};

pub const EXIT_SUCCESS: i32 = 0;
/// At least one sweep entry failed verification or execution.
pub const EXIT_CONFORMANCE_FAIL: i32 = 1;
/// The device could not be opened or queried.
pub const EXIT_DEVICE_FAIL: i32 = 2;
pub const EXIT_CONFIG_FAIL: i32 = 3;

/// Exit code for an error that aborted a command.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.chain().any(|e| e.is::<ConfigError>()) {
        EXIT_CONFIG_FAIL
    } else if err.chain().any(|e| e.is::<ProbeError>()) {
        EXIT_DEVICE_FAIL
    } else {
        EXIT_CONFORMANCE_FAIL
    }
}
