//! `strided sweep`: list the transfers a run would test.

use anyhow::Result;
use clap::Args;
use strided_common::ElementType;

use super::build_sweep;
use crate::exit::EXIT_SUCCESS;
use crate::session::Session;

/// List sweep entries for the selected device in execution order.
#[derive(Args, Debug, Clone, Default)]
pub struct SweepCommand {
    /// Only list these element types (comma separated)
    #[arg(long = "type", value_name = "TYPE", value_delimiter = ',')]
    pub types: Vec<ElementType>,

    /// Only list these strides (comma separated)
    #[arg(long = "stride", value_name = "STRIDE", value_delimiter = ',')]
    pub strides: Vec<u32>,

    /// Print only the number of entries
    #[arg(long)]
    pub count: bool,
}

impl SweepCommand {
    pub fn execute(&self, session: &Session) -> Result<i32> {
        let caps = session.device.open(&session.config)?.query()?;
        let sweep = build_sweep(&caps, &self.types, &self.strides);
        if self.count {
            println!("{}", sweep.len());
        } else {
            for spec in sweep {
                println!("{spec}");
            }
        }
        Ok(EXIT_SUCCESS)
    }
}
