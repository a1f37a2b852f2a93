//! Kernel compilation and execution on a real OpenCL device.

use std::ptr;

use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::kernel::{ExecuteKernel, Kernel};
use opencl3::memory::{Buffer, CL_MEM_READ_ONLY, CL_MEM_READ_WRITE, ClMem};
use opencl3::program::Program;
use opencl3::types::{CL_BLOCKING, cl_device_id, cl_int};
use strided_common::{CopyDirection, ExecutionError, ProbeError, TransferSpec};
use strided_core::{ExecutionGeometry, TransferExecutor, check_input_len};
use tracing::{debug, info};

use crate::device::OpenClDevice;
use crate::kernels::{KERNEL_NAME, kernel_source};

/// A compiled copy kernel together with the program that owns it.
pub struct OpenClKernel {
    kernel: Kernel,
    _program: Program,
    label: String,
}

impl std::fmt::Debug for OpenClKernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenClKernel").field("label", &self.label).finish_non_exhaustive()
    }
}

/// Runs copy kernels on one device through a single in-order queue.
pub struct OpenClExecutor {
    device_id: cl_device_id,
    context: Context,
    queue: CommandQueue,
}

// SAFETY: OpenCL handles are thread-safe when used with proper synchronization.
// Every enqueue is blocking, so the queue never has outstanding work.
unsafe impl Send for OpenClExecutor {}
unsafe impl Sync for OpenClExecutor {}

impl std::fmt::Debug for OpenClExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenClExecutor").finish_non_exhaustive()
    }
}

fn to_usize(value: u64, what: &str) -> Result<usize, ExecutionError> {
    usize::try_from(value)
        .map_err(|_| ExecutionError::LaunchFailed(format!("{what} {value} exceeds usize")))
}

fn to_cl_int(value: u64, what: &str) -> Result<cl_int, ExecutionError> {
    cl_int::try_from(value)
        .map_err(|_| ExecutionError::LaunchFailed(format!("{what} {value} exceeds cl_int")))
}

impl OpenClExecutor {
    /// Create a context and command queue on `device`.
    pub fn new(device: &OpenClDevice) -> Result<Self, ProbeError> {
        let context = Context::from_device(&device.device).map_err(|e| ProbeError::QueryFailed {
            query: "clCreateContext",
            reason: e.to_string(),
        })?;
        let queue = CommandQueue::create_default_with_properties(&context, 0, 0).map_err(|e| {
            ProbeError::QueryFailed { query: "clCreateCommandQueue", reason: e.to_string() }
        })?;
        info!(device = device.name(), "OpenCL executor ready");
        Ok(Self { device_id: device.device.id(), context, queue })
    }

    fn create_buffer(&self, flags: u64, size: usize) -> Result<Buffer<u8>, ExecutionError> {
        // SAFETY: no host pointer is passed; the buffer is filled by a blocking write.
        unsafe { Buffer::<u8>::create(&self.context, flags, size, ptr::null_mut()) }.map_err(|e| {
            ExecutionError::AllocationFailed { size_bytes: size as u64, reason: e.to_string() }
        })
    }
}

impl TransferExecutor for OpenClExecutor {
    type Kernel = OpenClKernel;

    fn compile(
        &self,
        spec: &TransferSpec,
        direction: CopyDirection,
    ) -> Result<Self::Kernel, ExecutionError> {
        let label = format!("{} {}", direction.test_name(), spec.type_name());
        let source = kernel_source(spec, direction);
        let program = Program::create_and_build_from_source(&self.context, &source, "")
            .map_err(|log| ExecutionError::CompileFailed { kernel: label.clone(), log })?;
        let kernel = Kernel::create(&program, KERNEL_NAME).map_err(|e| {
            ExecutionError::CompileFailed { kernel: label.clone(), log: e.to_string() }
        })?;
        debug!(kernel = %label, "compiled copy kernel");
        Ok(OpenClKernel { kernel, _program: program, label })
    }

    fn max_work_group_size(&self, kernel: &Self::Kernel) -> Result<u64, ExecutionError> {
        kernel
            .kernel
            .get_work_group_size(self.device_id)
            .map(|size| size as u64)
            .map_err(|e| ExecutionError::WorkGroupQuery(e.to_string()))
    }

    fn run(
        &self,
        kernel: &Self::Kernel,
        geometry: &ExecutionGeometry,
        stride: u32,
        input: &[u8],
    ) -> Result<Vec<u8>, ExecutionError> {
        check_input_len(geometry, input)?;
        let size = to_usize(geometry.global_buffer_bytes(), "global buffer")?;
        let local_bytes = to_usize(geometry.local_buffer_bytes(), "local buffer")?;
        let global_work_size = to_usize(geometry.global_work_size(), "global work size")?;
        let local_work_size = to_usize(geometry.local_workgroup_size(), "local work size")?;
        let copies_per_workgroup = to_cl_int(geometry.copies_per_workgroup(), "copies per work-group")?;
        let copies_per_work_item = to_cl_int(geometry.copies_per_work_item(), "copies per work item")?;
        let stride = to_cl_int(u64::from(stride), "stride")?;

        let mut src = self.create_buffer(CL_MEM_READ_ONLY, size)?;
        let mut dst = self.create_buffer(CL_MEM_READ_WRITE, size)?;
        let zeros = vec![0u8; size];

        // SAFETY: blocking writes from host slices that outlive the calls.
        unsafe {
            self.queue
                .enqueue_write_buffer(&mut src, CL_BLOCKING, 0, input, &[])
                .map_err(|e| ExecutionError::LaunchFailed(format!("write source: {e}")))?;
            self.queue
                .enqueue_write_buffer(&mut dst, CL_BLOCKING, 0, &zeros, &[])
                .map_err(|e| ExecutionError::LaunchFailed(format!("zero destination: {e}")))?;
        }

        // SAFETY: argument order and types match the `test_fn` signature.
        let event = unsafe {
            ExecuteKernel::new(&kernel.kernel)
                .set_arg(&src.get())
                .set_arg(&dst.get())
                .set_arg_local_buffer(local_bytes)
                .set_arg(&copies_per_workgroup)
                .set_arg(&copies_per_work_item)
                .set_arg(&stride)
                .set_global_work_size(global_work_size)
                .set_local_work_size(local_work_size)
                .enqueue_nd_range(&self.queue)
                .map_err(|e| ExecutionError::LaunchFailed(e.to_string()))?
        };
        event
            .wait()
            .map_err(|e| ExecutionError::LaunchFailed(format!("kernel wait: {e}")))?;

        let mut output = vec![0u8; size];
        // SAFETY: blocking read into a host slice of the buffer's size.
        unsafe {
            self.queue
                .enqueue_read_buffer(&dst, CL_BLOCKING, 0, &mut output, &[])
                .map_err(|e| ExecutionError::ReadFailed(e.to_string()))?;
        }
        Ok(output)
    }
}
