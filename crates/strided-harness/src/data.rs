//! Seeded input data for copy transfers.

use half::f16;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use strided_common::ElementType;

/// Magnitude bound for generated floating point values.
const FLOAT_RANGE: f64 = 1e3;

/// Deterministic source of input buffers.
///
/// Floating point types get finite values so every bit pattern survives a
/// copy unchanged; integer types get raw random bytes.
#[derive(Debug, Clone)]
pub struct InputGenerator {
    rng: ChaCha20Rng,
}

impl InputGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha20Rng::seed_from_u64(seed) }
    }

    /// Produce `len_bytes` bytes of `element_type` scalars.
    ///
    /// A trailing partial scalar is left zeroed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn generate(&mut self, element_type: ElementType, len_bytes: usize) -> Vec<u8> {
        let scalar = usize::try_from(element_type.size_bytes()).unwrap_or(1);
        let count = len_bytes / scalar;
        let mut bytes = match element_type {
            ElementType::Float => {
                let values: Vec<f32> = (0..count).map(|_| self.float() as f32).collect();
                bytemuck::cast_slice(&values).to_vec()
            }
            ElementType::Half => {
                let values: Vec<f16> = (0..count).map(|_| f16::from_f64(self.float())).collect();
                bytemuck::cast_slice(&values).to_vec()
            }
            ElementType::Double => {
                let values: Vec<f64> = (0..count).map(|_| self.float()).collect();
                bytemuck::cast_slice(&values).to_vec()
            }
            _ => {
                let mut raw = vec![0u8; count * scalar];
                self.rng.fill_bytes(&mut raw);
                raw
            }
        };
        bytes.resize(len_bytes, 0);
        bytes
    }

    fn float(&mut self) -> f64 {
        self.rng.gen_range(-FLOAT_RANGE..FLOAT_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_bytes() {
        let a = InputGenerator::new(7).generate(ElementType::Int, 256);
        let b = InputGenerator::new(7).generate(ElementType::Int, 256);
        let c = InputGenerator::new(8).generate(ElementType::Int, 256);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn floats_are_finite_and_bounded() {
        let bytes = InputGenerator::new(1).generate(ElementType::Float, 4 * 1000);
        let values: &[f32] = bytemuck::cast_slice(&bytes);
        assert!(values.iter().all(|v| v.is_finite() && v.abs() <= 1e3));

        let bytes = InputGenerator::new(1).generate(ElementType::Double, 8 * 1000);
        let values: Vec<f64> = bytes
            .chunks_exact(8)
            .map(|c| f64::from_ne_bytes(c.try_into().unwrap()))
            .collect();
        assert!(values.iter().all(|v| v.is_finite() && v.abs() <= 1e3));
    }

    #[test]
    fn halves_are_finite() {
        let bytes = InputGenerator::new(3).generate(ElementType::Half, 2 * 500);
        let values: Vec<f16> = bytes
            .chunks_exact(2)
            .map(|c| f16::from_ne_bytes([c[0], c[1]]))
            .collect();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn length_is_exact_for_every_type() {
        let mut generator = InputGenerator::new(0);
        for ty in ElementType::ALL {
            assert_eq!(generator.generate(ty, 96).len(), 96);
            assert_eq!(generator.generate(ty, 0).len(), 0);
        }
    }

    #[test]
    fn trailing_partial_scalar_is_zero() {
        let bytes = InputGenerator::new(5).generate(ElementType::Double, 12);
        assert_eq!(&bytes[8..], &[0, 0, 0, 0]);
    }
}
