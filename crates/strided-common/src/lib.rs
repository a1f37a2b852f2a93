//! Common types, errors, and configuration for the strided async copy
//! conformance suite.
//!
//! This crate provides the vocabulary shared by every other crate in the
//! workspace: the element/vector/stride description of a single transfer
//! ([`TransferSpec`]), the copy direction under test, the error taxonomy,
//! and the TOML + environment configuration layer.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Backend, ConfigError, ConformanceConfig, DirectionSelection, LogFormat, LoggingConfig};
pub use error::{ExecutionError, PlanError, ProbeError, SpecError};
pub use types::{CopyDirection, ElementType, TransferSpec, VectorWidth};
