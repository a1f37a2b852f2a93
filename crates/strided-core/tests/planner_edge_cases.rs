//! Edge-case tests for geometry planning and verification boundaries.

use strided_common::{ElementType, PlanError, TransferSpec, VectorWidth};
use strided_core::{
    COPIES_PER_WORK_ITEM, PlannerLimits, StridedVerifier, VerifyError, plan_geometry, verify,
};
use strided_device_probe::{CapabilitySnapshot, DeviceProfile};

fn spec(ty: ElementType, width: VectorWidth, stride: u32) -> TransferSpec {
    TransferSpec::new(ty, width, stride).unwrap()
}

fn mock_with(local: u64, global: u64) -> CapabilitySnapshot {
    CapabilitySnapshot {
        local_memory_bytes: local,
        global_memory_bytes: global,
        ..DeviceProfile::Mock.snapshot()
    }
}

// ── Local memory ────────────────────────────────────────────────────────────

#[test]
fn exactly_one_work_item_of_local_memory() {
    // float16: 64 B element, 192 B per work item, so 384 B of local memory fits one.
    let s = spec(ElementType::Float, VectorWidth::Sixteen, 1);
    let geo = plan_geometry(&mock_with(384, 1 << 30), &s, 1024, &PlannerLimits::default()).unwrap();
    assert_eq!(geo.local_workgroup_size(), 1);
    assert_eq!(geo.local_buffer_bytes(), 192);
}

#[test]
fn one_byte_short_of_one_work_item() {
    let s = spec(ElementType::Float, VectorWidth::Sixteen, 1);
    let err = plan_geometry(&mock_with(383, 1 << 30), &s, 1024, &PlannerLimits::default())
        .unwrap_err();
    assert!(matches!(err, PlanError::ResourceExhausted { .. }));
}

#[test]
fn zero_local_memory_is_resource_exhausted() {
    let s = spec(ElementType::Char, VectorWidth::One, 1);
    assert!(plan_geometry(&mock_with(0, 1 << 30), &s, 1024, &PlannerLimits::default()).is_err());
}

#[test]
fn three_wide_vectors_use_padded_element_size() {
    // char3 occupies 4 B.
    let s = spec(ElementType::Char, VectorWidth::Three, 1);
    let geo = plan_geometry(&mock_with(64 * 1024, 1 << 30), &s, 1024, &PlannerLimits::default())
        .unwrap();
    assert_eq!(geo.element_size_bytes(), 4);
    assert_eq!(geo.local_buffer_bytes(), geo.local_workgroup_size() * 4 * COPIES_PER_WORK_ITEM);
}

// ── Work-group size ─────────────────────────────────────────────────────────

#[test]
fn device_wide_limit_is_informational() {
    let caps = CapabilitySnapshot { max_work_group_size: 16, ..DeviceProfile::Mock.snapshot() };
    let s = spec(ElementType::Int, VectorWidth::One, 1);
    let geo = plan_geometry(&caps, &s, 512, &PlannerLimits::default()).unwrap();
    assert_eq!(geo.local_workgroup_size(), 512);
}

#[test]
fn zero_first_dimension_is_resource_exhausted() {
    let caps = CapabilitySnapshot { max_work_item_sizes: [0, 1024, 64], ..DeviceProfile::Mock.snapshot() };
    let s = spec(ElementType::Int, VectorWidth::One, 1);
    assert!(plan_geometry(&caps, &s, 1024, &PlannerLimits::default()).is_err());
}

// ── Global memory ───────────────────────────────────────────────────────────

#[test]
fn exactly_one_work_group_of_global_memory() {
    // uchar, 1024 items: 3072 B local buffer, 2 * 2 * 3072 B per work-group.
    let s = spec(ElementType::UChar, VectorWidth::One, 1);
    let geo = plan_geometry(&mock_with(64 * 1024, 12288), &s, 1024, &PlannerLimits::default())
        .unwrap();
    assert_eq!(geo.number_of_workgroups(), 1);
    assert_eq!(geo.global_buffer_bytes(), 3072);
}

#[test]
fn target_workgroups_caps_count_on_large_devices() {
    let s = spec(ElementType::UChar, VectorWidth::One, 1);
    let geo = plan_geometry(&mock_with(64 * 1024, u64::MAX), &s, 1024, &PlannerLimits::default())
        .unwrap();
    assert_eq!(geo.number_of_workgroups(), 579);
}

#[test]
fn zero_target_workgroups_is_resource_exhausted() {
    let s = spec(ElementType::UChar, VectorWidth::One, 1);
    let limits = PlannerLimits { target_workgroups: 0, ..PlannerLimits::default() };
    assert!(plan_geometry(&DeviceProfile::Mock.snapshot(), &s, 1024, &limits).is_err());
}

#[test]
fn huge_stride_does_not_overflow() {
    let s = spec(ElementType::Double, VectorWidth::Sixteen, u32::MAX);
    let result = plan_geometry(&mock_with(64 * 1024, u64::MAX), &s, 1024, &PlannerLimits::default());
    let geo = result.unwrap();
    assert_eq!(geo.number_of_workgroups(), 579);
    assert!(geo.global_buffer_bytes().checked_mul(geo.buffer_multiplier() * 2).is_some());
}

// ── Verification ────────────────────────────────────────────────────────────

#[test]
fn trailing_partial_window_is_compared() {
    // 10 B buffer, 4 B elements, stride 2: windows at 0 and 8, the last clamped to 2 B.
    let verifier = StridedVerifier::new(4, 2, 4).unwrap();
    let reference = vec![1u8; 10];
    let mut observed = reference.clone();
    observed[9] = 0;
    let result = verifier.verify(&reference, &observed).unwrap();
    let mismatch = result.mismatch.unwrap();
    assert_eq!(mismatch.offset, 8);
    assert_eq!(mismatch.expected_bytes, vec![1, 1]);
}

#[test]
fn free_verify_uses_geometry_and_spec() {
    let s = spec(ElementType::Int, VectorWidth::Three, 4);
    let geo = plan_geometry(&DeviceProfile::Mock.snapshot(), &s, 1024, &PlannerLimits::default())
        .unwrap();
    let len = usize::try_from(geo.element_size_bytes()).unwrap() * 4 * 8;
    let reference = vec![3u8; len];
    let mut observed = reference.clone();
    // Padding lane of the first element.
    observed[12] = 0;
    let result = verify(&reference, &observed, &s, &geo).unwrap();
    assert!(result.success());
    assert_eq!(result.windows_checked, 8);
}

#[test]
fn free_verify_rejects_length_mismatch() {
    let s = spec(ElementType::Int, VectorWidth::One, 1);
    let geo = plan_geometry(&DeviceProfile::Mock.snapshot(), &s, 1024, &PlannerLimits::default())
        .unwrap();
    let err = verify(&[0; 16], &[0; 8], &s, &geo).unwrap_err();
    assert!(matches!(err, VerifyError::LengthMismatch { reference: 16, observed: 8 }));
}
