//! OpenCL collaborators for the strided async copy conformance suite.
//!
//! [`kernels`] renders the program source for every transfer and is always
//! available. With the `opencl` feature, [`OpenClDevice`] answers capability
//! queries from a real device and [`OpenClExecutor`] compiles and runs the
//! copy kernels through `opencl3`.

pub mod kernels;

#[cfg(feature = "opencl")]
mod device;
#[cfg(feature = "opencl")]
mod executor;

#[cfg(feature = "opencl")]
pub use device::{DeviceListing, OpenClDevice};
#[cfg(feature = "opencl")]
pub use executor::{OpenClExecutor, OpenClKernel};
pub use kernels::{KERNEL_NAME, kernel_source};
