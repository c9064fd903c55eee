//! `roster report`: show the last recorded run.

use anyhow::{Context, Result};
use clap::Args;

use roster_sync::run_store;

use super::home;
use super::sync::print_report;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let Some(report) =
            run_store::load_last_at(&home).context("failed to read last run report")?
        else {
            println!("No sync run recorded yet. Run `roster sync` first.");
            return Ok(());
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize run report")?
            );
        } else {
            print_report(&report);
        }
        Ok(())
    }
}
