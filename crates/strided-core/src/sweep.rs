//! Transfer spec enumeration.
//!
//! The sweep visits element type × vector width × stride in a fixed order so
//! diagnostic output is reproducible between runs. Types the device cannot
//! handle are dropped up front; widths and strides are never filtered by
//! capability.

use std::iter::FusedIterator;

use strided_common::{ElementType, TransferSpec, VectorWidth};
use strided_device_probe::TypeSupport;

/// Strides exercised by a full sweep.
pub const SWEEP_STRIDES: [u32; 4] = [1, 3, 4, 5];

/// Lazy, finite, restartable sequence of [`TransferSpec`]s.
///
/// Cloning yields an independent cursor; [`restart`](Self::restart) rewinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSpecSweep {
    types: Vec<ElementType>,
    widths: Vec<VectorWidth>,
    strides: Vec<u32>,
    position: usize,
}

impl TransferSpecSweep {
    /// Full sweep over every type the device supports.
    pub fn new(support: &impl TypeSupport) -> Self {
        Self::restricted(support, &ElementType::ALL, &SWEEP_STRIDES)
    }

    /// Sweep over a subset of types and strides.
    ///
    /// Types keep the canonical order regardless of how `types` is ordered.
    /// Strides are sorted, deduplicated, and zero strides are dropped.
    pub fn restricted(support: &impl TypeSupport, types: &[ElementType], strides: &[u32]) -> Self {
        let types = ElementType::ALL
            .into_iter()
            .filter(|ty| types.contains(ty))
            .filter(|ty| {
                let supported = support.supports(*ty);
                if !supported {
                    tracing::debug!(element_type = %ty, "element type unsupported, skipping");
                }
                supported
            })
            .collect();

        let mut strides: Vec<u32> = strides.iter().copied().filter(|s| *s > 0).collect();
        strides.sort_unstable();
        strides.dedup();

        Self { types, widths: VectorWidth::ALL.to_vec(), strides, position: 0 }
    }

    /// Element types that survived capability filtering.
    pub fn element_types(&self) -> &[ElementType] {
        &self.types
    }

    pub fn strides(&self) -> &[u32] {
        &self.strides
    }

    /// Total number of specs, independent of the cursor.
    pub fn total(&self) -> usize {
        self.types.len() * self.widths.len() * self.strides.len()
    }

    /// Rewind to the first spec.
    pub fn restart(&mut self) {
        self.position = 0;
    }

    fn spec_at(&self, position: usize) -> Option<TransferSpec> {
        let per_type = self.widths.len() * self.strides.len();
        if per_type == 0 {
            return None;
        }
        let ty = *self.types.get(position / per_type)?;
        let width = self.widths[(position / self.strides.len()) % self.widths.len()];
        let stride = self.strides[position % self.strides.len()];
        TransferSpec::new(ty, width, stride).ok()
    }
}

impl Iterator for TransferSpecSweep {
    type Item = TransferSpec;

    fn next(&mut self) -> Option<Self::Item> {
        let spec = self.spec_at(self.position)?;
        self.position += 1;
        Some(spec)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TransferSpecSweep {}

impl FusedIterator for TransferSpecSweep {}
