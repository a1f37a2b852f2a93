use proptest::prelude::*;
use strided_common::{CopyDirection, ElementType, TransferSpec, VectorWidth};

fn element_type() -> impl Strategy<Value = ElementType> {
    proptest::sample::select(ElementType::ALL.to_vec())
}

fn vector_width() -> impl Strategy<Value = VectorWidth> {
    proptest::sample::select(VectorWidth::ALL.to_vec())
}

proptest! {
    #[test]
    fn compare_width_never_exceeds_element_size(
        ty in element_type(),
        width in vector_width(),
        stride in 1u32..=64,
    ) {
        let spec = TransferSpec::new(ty, width, stride).unwrap();
        prop_assert!(spec.compare_width_bytes() <= spec.element_size_bytes());
        prop_assert_eq!(spec.element_size_bytes() % ty.size_bytes(), 0);
        if width == VectorWidth::Three {
            prop_assert_eq!(spec.element_size_bytes() - spec.compare_width_bytes(), ty.size_bytes());
        } else {
            prop_assert_eq!(spec.element_size_bytes(), spec.compare_width_bytes());
        }
    }

    #[test]
    fn element_sizes_are_powers_of_two(ty in element_type(), width in vector_width()) {
        let spec = TransferSpec::new(ty, width, 1).unwrap();
        prop_assert!(spec.element_size_bytes().is_power_of_two());
    }

    #[test]
    fn type_name_starts_with_cl_name(ty in element_type(), width in vector_width()) {
        let spec = TransferSpec::new(ty, width, 1).unwrap();
        let name = spec.type_name();
        prop_assert!(name.starts_with(ty.cl_name()));
        let suffix = &name[ty.cl_name().len()..];
        if width == VectorWidth::One {
            prop_assert!(suffix.is_empty());
        } else {
            prop_assert_eq!(suffix.parse::<u32>().unwrap(), u32::from(width));
        }
    }

    #[test]
    fn cl_names_parse_back(ty in element_type()) {
        prop_assert_eq!(ty.cl_name().parse::<ElementType>().unwrap(), ty);
        prop_assert_eq!(ty.cl_name().to_uppercase().parse::<ElementType>().unwrap(), ty);
    }

    #[test]
    fn widths_convert_through_u32(width in vector_width()) {
        prop_assert_eq!(VectorWidth::try_from(u32::from(width)).unwrap(), width);
    }

    #[test]
    fn unsupported_widths_rejected(lanes in 0u32..64) {
        prop_assume!(![1, 2, 3, 4, 8, 16].contains(&lanes));
        prop_assert!(VectorWidth::try_from(lanes).is_err());
    }

    #[test]
    fn directions_parse_from_display(index in 0usize..2) {
        let dir = CopyDirection::ALL[index];
        prop_assert_eq!(dir.to_string().parse::<CopyDirection>().unwrap(), dir);
    }
}
