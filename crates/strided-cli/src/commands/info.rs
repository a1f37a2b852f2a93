//! `strided info`: describe the selected device.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use strided_common::ElementType;
use strided_device_probe::{TypeSupport, format_device_info};

use crate::exit::EXIT_SUCCESS;
use crate::session::Session;

/// Show the capability snapshot of the selected device.
#[derive(Args, Debug, Clone, Default)]
pub struct InfoCommand {
    /// Print the snapshot as JSON
    #[arg(long)]
    pub json: bool,

    /// List every OpenCL platform and device instead
    #[arg(long)]
    pub list: bool,
}

impl InfoCommand {
    pub fn execute(&self, session: &Session) -> Result<i32> {
        if self.list {
            list_devices()?;
            return Ok(EXIT_SUCCESS);
        }

        let caps = session.device.open(&session.config)?.query()?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&caps).context("Failed to serialize snapshot")?);
            return Ok(EXIT_SUCCESS);
        }

        println!("{}", style("Device Capabilities").bold().cyan());
        println!("{}", format_device_info(&caps));
        let types: Vec<&str> = ElementType::ALL
            .into_iter()
            .filter(|ty| caps.supports(*ty))
            .map(ElementType::cl_name)
            .collect();
        println!("Sweep types:     {}", types.join(" "));
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(feature = "opencl")]
fn list_devices() -> Result<()> {
    let devices = strided_opencl::OpenClDevice::enumerate()?;
    println!("{}", style("OpenCL Devices").bold().cyan());
    for d in devices {
        println!("  [{}:{}] {} ({})", d.platform_index, d.device_index, d.device_name, d.platform_name);
    }
    Ok(())
}

#[cfg(not(feature = "opencl"))]
fn list_devices() -> Result<()> {
    Err(strided_common::ProbeError::BackendUnavailable("opencl".to_string()).into())
}
