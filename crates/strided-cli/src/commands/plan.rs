//! `strided plan`: show the geometry one transfer would use.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use strided_common::{ElementType, TransferSpec, VectorWidth};
use strided_core::{PlannerLimits, plan_geometry};
use strided_device_probe::TypeSupport;
use tracing::warn;

use crate::exit::EXIT_SUCCESS;
use crate::render::format_geometry;
use crate::session::Session;

/// Plan a single transfer against the selected device.
#[derive(Args, Debug, Clone)]
pub struct PlanCommand {
    /// Element type, e.g. float or uchar
    #[arg(long = "type", value_name = "TYPE")]
    pub element_type: ElementType,

    /// Vector width: 1, 2, 3, 4, 8 or 16
    #[arg(long, default_value_t = 1)]
    pub width: u32,

    #[arg(long, default_value_t = 1)]
    pub stride: u32,

    /// Kernel work-group limit (defaults to the device-wide limit)
    #[arg(long, value_name = "N")]
    pub kernel_limit: Option<u64>,

    /// Print the geometry as JSON
    #[arg(long)]
    pub json: bool,
}

impl PlanCommand {
    pub fn execute(&self, session: &Session) -> Result<i32> {
        let spec = TransferSpec::new(self.element_type, VectorWidth::try_from(self.width)?, self.stride)?;
        let caps = session.device.open(&session.config)?.query()?;
        if !caps.supports(spec.element_type()) {
            warn!(device = %caps.name, "{} is not supported; a sweep would skip it", spec.element_type());
        }

        let kernel_limit = self.kernel_limit.unwrap_or(caps.max_work_group_size);
        let geometry =
            plan_geometry(&caps, &spec, kernel_limit, &PlannerLimits::from(&session.config))
                .with_context(|| format!("No geometry fits {spec} on {}", caps.name))?;

        if self.json {
            let value = json!({ "spec": spec, "geometry": geometry });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", format_geometry(&spec, &geometry));
        }
        Ok(EXIT_SUCCESS)
    }
}
