//! Building blocks of the `strided` binary.
//!
//! The binary itself only parses arguments, installs logging and maps errors
//! to exit codes; everything it runs lives here so integration tests can
//! reach it.

pub mod commands;
pub mod device;
pub mod exit;
pub mod render;
pub mod session;

pub use device::DeviceSelection;
pub use session::{Session, load_configuration};
