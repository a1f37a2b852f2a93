//! Strided verification of copy results.
//!
//! Only the windows the copy was supposed to write are compared: one window
//! of `compare_width_bytes` every `element_size_bytes * stride` bytes. Gap
//! bytes between windows hold whatever the destination held before the copy
//! and are never inspected. Padding lanes of 3-wide vectors are excluded by
//! the compare width being narrower than the element size.

use std::fmt;

use serde::Serialize;
use strided_common::TransferSpec;

use crate::planner::ExecutionGeometry;

/// Precondition violations that prevent a comparison.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("buffer lengths differ: reference {reference} B, observed {observed} B")]
    LengthMismatch { reference: usize, observed: usize },

    #[error("invalid verification layout: {0}")]
    InvalidLayout(String),
}

/// First diverging window, with the surrounding element for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Byte offset of the window start.
    pub offset: usize,
    /// Whole padded element from the reference buffer, clamped to its end.
    pub expected_bytes: Vec<u8>,
    /// Whole padded element from the observed buffer, clamped to its end.
    pub actual_bytes: Vec<u8>,
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ")
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> [{}] != [{}]",
            self.offset,
            hex_bytes(&self.expected_bytes),
            hex_bytes(&self.actual_bytes)
        )
    }
}

/// Outcome of verifying one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Windows compared, including the mismatching one.
    pub windows_checked: usize,
    pub mismatch: Option<Mismatch>,
}

impl VerificationResult {
    pub const fn success(&self) -> bool {
        self.mismatch.is_none()
    }

    pub fn mismatch_offset(&self) -> Option<usize> {
        self.mismatch.as_ref().map(|m| m.offset)
    }
}

/// Window layout for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StridedVerifier {
    element_size_bytes: usize,
    stride: usize,
    compare_width_bytes: usize,
}

impl StridedVerifier {
    pub fn new(
        element_size_bytes: usize,
        stride: usize,
        compare_width_bytes: usize,
    ) -> Result<Self, VerifyError> {
        if element_size_bytes == 0 || stride == 0 || compare_width_bytes == 0 {
            return Err(VerifyError::InvalidLayout(format!(
                "element size {element_size_bytes}, stride {stride} and compare width \
                 {compare_width_bytes} must all be non-zero"
            )));
        }
        if compare_width_bytes > element_size_bytes {
            return Err(VerifyError::InvalidLayout(format!(
                "compare width {compare_width_bytes} exceeds element size {element_size_bytes}"
            )));
        }
        Ok(Self { element_size_bytes, stride, compare_width_bytes })
    }

    /// Layout for `spec` as planned by `geometry`.
    pub fn for_transfer(
        spec: &TransferSpec,
        geometry: &ExecutionGeometry,
    ) -> Result<Self, VerifyError> {
        let to_usize = |value: u64, what: &str| {
            usize::try_from(value)
                .map_err(|_| VerifyError::InvalidLayout(format!("{what} {value} exceeds usize")))
        };
        Self::new(
            to_usize(geometry.element_size_bytes(), "element size")?,
            to_usize(u64::from(spec.stride()), "stride")?,
            to_usize(spec.compare_width_bytes(), "compare width")?,
        )
    }

    /// Distance in bytes between two window starts.
    pub const fn step_bytes(&self) -> usize {
        self.element_size_bytes * self.stride
    }

    pub const fn compare_width_bytes(&self) -> usize {
        self.compare_width_bytes
    }

    /// Window start offsets for a buffer of `len` bytes.
    pub fn offsets(&self, len: usize) -> impl Iterator<Item = usize> + use<> {
        (0..len).step_by(self.step_bytes())
    }

    /// Compare `observed` against `reference`, stopping at the first mismatch.
    pub fn verify(
        &self,
        reference: &[u8],
        observed: &[u8],
    ) -> Result<VerificationResult, VerifyError> {
        if reference.len() != observed.len() {
            return Err(VerifyError::LengthMismatch {
                reference: reference.len(),
                observed: observed.len(),
            });
        }

        let len = reference.len();
        let mut windows_checked = 0;
        for offset in self.offsets(len) {
            windows_checked += 1;
            let end = (offset + self.compare_width_bytes).min(len);
            if reference[offset..end] != observed[offset..end] {
                let element_end = (offset + self.element_size_bytes).min(len);
                return Ok(VerificationResult {
                    windows_checked,
                    mismatch: Some(Mismatch {
                        offset,
                        expected_bytes: reference[offset..element_end].to_vec(),
                        actual_bytes: observed[offset..element_end].to_vec(),
                    }),
                });
            }
        }

        Ok(VerificationResult { windows_checked, mismatch: None })
    }
}

/// Verify one transfer's output against its input.
pub fn verify(
    reference: &[u8],
    observed: &[u8],
    spec: &TransferSpec,
    geometry: &ExecutionGeometry,
) -> Result<VerificationResult, VerifyError> {
    StridedVerifier::for_transfer(spec, geometry)?.verify(reference, observed)
}
