//! OpenCL C sources for the strided async copy kernels.
//!
//! Both kernels share one signature so the executor binds arguments the same
//! way for either direction:
//!
//! ```text
//! test_fn(const __global T *src, __global T *dst, __local T *localBuffer,
//!         int copiesPerWorkgroup, int copiesPerWorkItem, int stride)
//! ```
//!
//! `$T` is replaced with the full vector type name (`float4`) and `$S` with
//! its scalar type (`float`).

use strided_common::{CopyDirection, ElementType, TransferSpec};

/// Entry point compiled from every generated program.
pub const KERNEL_NAME: &str = "test_fn";

/// Work-group pulls its strided slice of `src` into local memory with one
/// async copy, then every work item writes its local slots back to `dst`.
pub const GLOBAL_TO_LOCAL_SOURCE: &str = r"
__kernel void test_fn(const __global $T *src, __global $T *dst, __local $T *localBuffer,
                      int copiesPerWorkgroup, int copiesPerWorkItem, int stride)
{
    int i;
    for (i = 0; i < copiesPerWorkItem; i++)
        localBuffer[get_local_id(0) * copiesPerWorkItem + i] = ($T)($S)0;
    barrier(CLK_LOCAL_MEM_FENCE);

    event_t event = async_work_group_strided_copy(
        (__local $T *)localBuffer,
        (__global const $T *)(src + copiesPerWorkgroup * stride * get_group_id(0)),
        (size_t)copiesPerWorkgroup, (size_t)stride, 0);
    wait_group_events(1, &event);

    for (i = 0; i < copiesPerWorkItem; i++)
        dst[get_global_id(0) * copiesPerWorkItem * stride + i * stride] =
            localBuffer[get_local_id(0) * copiesPerWorkItem + i];
}
";

/// Every work item loads its strided slots of `src` into local memory, then
/// the work-group pushes local memory to `dst` with one async copy.
pub const LOCAL_TO_GLOBAL_SOURCE: &str = r"
__kernel void test_fn(const __global $T *src, __global $T *dst, __local $T *localBuffer,
                      int copiesPerWorkgroup, int copiesPerWorkItem, int stride)
{
    int i;
    for (i = 0; i < copiesPerWorkItem; i++)
        localBuffer[get_local_id(0) * copiesPerWorkItem + i] = ($T)($S)0;
    barrier(CLK_LOCAL_MEM_FENCE);

    for (i = 0; i < copiesPerWorkItem; i++)
        localBuffer[get_local_id(0) * copiesPerWorkItem + i] =
            src[get_global_id(0) * copiesPerWorkItem * stride + i * stride];
    barrier(CLK_LOCAL_MEM_FENCE);

    event_t event = async_work_group_strided_copy(
        (__global $T *)(dst + copiesPerWorkgroup * stride * get_group_id(0)),
        (__local const $T *)localBuffer,
        (size_t)copiesPerWorkgroup, (size_t)stride, 0);
    wait_group_events(1, &event);
}
";

/// Extension pragma the element type needs, if any.
pub const fn extension_pragma(element_type: ElementType) -> Option<&'static str> {
    match element_type {
        ElementType::Double => Some("#pragma OPENCL EXTENSION cl_khr_fp64 : enable"),
        ElementType::Half => Some("#pragma OPENCL EXTENSION cl_khr_fp16 : enable"),
        _ => None,
    }
}

/// Template for `direction`.
pub const fn template(direction: CopyDirection) -> &'static str {
    match direction {
        CopyDirection::GlobalToLocal => GLOBAL_TO_LOCAL_SOURCE,
        CopyDirection::LocalToGlobal => LOCAL_TO_GLOBAL_SOURCE,
    }
}

/// Render the program source for one transfer.
pub fn kernel_source(spec: &TransferSpec, direction: CopyDirection) -> String {
    let body = template(direction)
        .replace("$T", &spec.type_name())
        .replace("$S", spec.element_type().cl_name());
    match extension_pragma(spec.element_type()) {
        Some(pragma) => format!("{pragma}\n{}", body.trim_start()),
        None => body.trim_start().to_string(),
    }
}
