//! Element, vector width, and transfer descriptions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

// ── ElementType ──────────────────────────────────────────────────────────────

/// Scalar element type moved by the strided copy.
///
/// Variants follow the OpenCL C scalar type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// 8-bit signed integer.
    Char,
    /// 8-bit unsigned integer.
    UChar,
    /// 16-bit signed integer.
    Short,
    /// 16-bit unsigned integer.
    UShort,
    /// 32-bit signed integer.
    Int,
    /// 32-bit unsigned integer.
    UInt,
    /// 64-bit signed integer.
    Long,
    /// 64-bit unsigned integer.
    ULong,
    /// IEEE-754 binary32.
    Float,
    /// IEEE-754 binary16 (`cl_khr_fp16`).
    Half,
    /// IEEE-754 binary64 (`cl_khr_fp64`).
    Double,
}

impl ElementType {
    /// Every element type, in sweep order.
    pub const ALL: [Self; 11] = [
        Self::Char,
        Self::UChar,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Float,
        Self::Half,
        Self::Double,
    ];

    /// Size of one scalar in bytes.
    pub const fn size_bytes(self) -> u64 {
        match self {
            Self::Char | Self::UChar => 1,
            Self::Short | Self::UShort | Self::Half => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Long | Self::ULong | Self::Double => 8,
        }
    }

    /// OpenCL C spelling of the scalar type.
    pub const fn cl_name(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::UChar => "uchar",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Half => "half",
            Self::Double => "double",
        }
    }

    /// Whether the type is one of the 64-bit integer types.
    pub const fn is_64bit_int(self) -> bool {
        matches!(self, Self::Long | Self::ULong)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cl_name())
    }
}

impl FromStr for ElementType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|ty| ty.cl_name() == lowered)
            .ok_or(SpecError::UnknownElementType(lowered))
    }
}

// ── VectorWidth ──────────────────────────────────────────────────────────────

/// Number of scalar lanes per copied element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum VectorWidth {
    One,
    Two,
    Three,
    Four,
    Eight,
    Sixteen,
}

impl VectorWidth {
    /// Every width, in sweep order.
    pub const ALL: [Self; 6] =
        [Self::One, Self::Two, Self::Three, Self::Four, Self::Eight, Self::Sixteen];

    /// Logical lane count.
    pub const fn lanes(self) -> u64 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Eight => 8,
            Self::Sixteen => 16,
        }
    }

    /// Lanes occupied in memory. A 3-wide vector is stored as 4 lanes.
    pub const fn storage_lanes(self) -> u64 {
        match self {
            Self::Three => 4,
            other => other.lanes(),
        }
    }
}

impl TryFrom<u32> for VectorWidth {
    type Error = SpecError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            other => Err(SpecError::UnsupportedVectorWidth(other)),
        }
    }
}

impl From<VectorWidth> for u32 {
    fn from(width: VectorWidth) -> Self {
        match width {
            VectorWidth::One => 1,
            VectorWidth::Two => 2,
            VectorWidth::Three => 3,
            VectorWidth::Four => 4,
            VectorWidth::Eight => 8,
            VectorWidth::Sixteen => 16,
        }
    }
}

impl fmt::Display for VectorWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lanes())
    }
}

// ── TransferSpec ─────────────────────────────────────────────────────────────

/// One combination of element type, vector width, and stride under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TransferSpec {
    element_type: ElementType,
    vector_width: VectorWidth,
    stride: u32,
}

impl TransferSpec {
    /// Build a spec, rejecting a zero stride.
    pub fn new(
        element_type: ElementType,
        vector_width: VectorWidth,
        stride: u32,
    ) -> Result<Self, SpecError> {
        if stride == 0 {
            return Err(SpecError::ZeroStride);
        }
        Ok(Self { element_type, vector_width, stride })
    }

    pub const fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub const fn vector_width(&self) -> VectorWidth {
        self.vector_width
    }

    /// Distance, in elements, between two copied elements. Always ≥ 1.
    pub const fn stride(&self) -> u32 {
        self.stride
    }

    /// Bytes one element occupies in memory, including 3-wide padding.
    pub const fn element_size_bytes(&self) -> u64 {
        self.element_type.size_bytes() * self.vector_width.storage_lanes()
    }

    /// Bytes that carry data within one element; padding lanes excluded.
    pub const fn compare_width_bytes(&self) -> u64 {
        self.element_type.size_bytes() * self.vector_width.lanes()
    }

    /// OpenCL type name of the copied element, e.g. `float` or `uchar16`.
    pub fn type_name(&self) -> String {
        match self.vector_width {
            VectorWidth::One => self.element_type.cl_name().to_string(),
            width => format!("{}{}", self.element_type.cl_name(), width.lanes()),
        }
    }
}

impl fmt::Display for TransferSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stride {}", self.type_name(), self.stride)
    }
}

// ── CopyDirection ────────────────────────────────────────────────────────────

/// Which memory tier the async copy reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyDirection {
    /// `async_work_group_strided_copy` from global into local memory.
    GlobalToLocal,
    /// `async_work_group_strided_copy` from local into global memory.
    LocalToGlobal,
}

impl CopyDirection {
    pub const ALL: [Self; 2] = [Self::GlobalToLocal, Self::LocalToGlobal];

    /// Registered test name for this direction.
    pub const fn test_name(self) -> &'static str {
        match self {
            Self::GlobalToLocal => "async_strided_copy_global_to_local",
            Self::LocalToGlobal => "async_strided_copy_local_to_global",
        }
    }
}

impl fmt::Display for CopyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalToLocal => write!(f, "global-to-local"),
            Self::LocalToGlobal => write!(f, "local-to-global"),
        }
    }
}

impl FromStr for CopyDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global-to-local" | "g2l" => Ok(Self::GlobalToLocal),
            "local-to-global" | "l2g" => Ok(Self::LocalToGlobal),
            other => Err(format!("unknown copy direction: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_wide_vectors_pad_to_four_lanes() {
        for ty in ElementType::ALL {
            let spec = TransferSpec::new(ty, VectorWidth::Three, 1).unwrap();
            assert_eq!(spec.element_size_bytes(), ty.size_bytes() * 4);
            assert_eq!(spec.compare_width_bytes(), ty.size_bytes() * 3);
        }
    }

    #[test]
    fn other_widths_are_unpadded() {
        for width in VectorWidth::ALL.into_iter().filter(|w| *w != VectorWidth::Three) {
            let spec = TransferSpec::new(ElementType::Short, width, 4).unwrap();
            assert_eq!(spec.element_size_bytes(), spec.compare_width_bytes());
        }
    }

    #[test]
    fn only_long_and_ulong_are_64bit_ints() {
        let wide: Vec<_> = ElementType::ALL.into_iter().filter(|ty| ty.is_64bit_int()).collect();
        assert_eq!(wide, vec![ElementType::Long, ElementType::ULong]);
    }

    #[test]
    fn zero_stride_rejected() {
        let err = TransferSpec::new(ElementType::Int, VectorWidth::One, 0).unwrap_err();
        assert_eq!(err, SpecError::ZeroStride);
    }

    #[test]
    fn type_name_omits_width_one() {
        let scalar = TransferSpec::new(ElementType::UChar, VectorWidth::One, 1).unwrap();
        let vector = TransferSpec::new(ElementType::UChar, VectorWidth::Sixteen, 1).unwrap();
        assert_eq!(scalar.type_name(), "uchar");
        assert_eq!(vector.type_name(), "uchar16");
    }

    #[test]
    fn element_type_parses_case_insensitively() {
        assert_eq!("ULONG".parse::<ElementType>().unwrap(), ElementType::ULong);
        assert_eq!(" half ".parse::<ElementType>().unwrap(), ElementType::Half);
        assert!("quad".parse::<ElementType>().is_err());
    }

    #[test]
    fn vector_width_rejects_unsupported_lanes() {
        assert_eq!(VectorWidth::try_from(8).unwrap(), VectorWidth::Eight);
        assert_eq!(VectorWidth::try_from(5).unwrap_err(), SpecError::UnsupportedVectorWidth(5));
    }

    #[test]
    fn direction_short_aliases() {
        assert_eq!("g2l".parse::<CopyDirection>().unwrap(), CopyDirection::GlobalToLocal);
        assert_eq!("Local-To-Global".parse::<CopyDirection>().unwrap(), CopyDirection::LocalToGlobal);
    }
}
