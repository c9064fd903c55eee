//! `roster sync`: apply a run and record its report.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use roster_adapters::Collaborators;
use roster_core::TriggerKind;
use roster_sync::{run_store, RunReport};

use super::{block_on, home, load_config};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Use the background budget instead of the interactive one.
    #[arg(long)]
    pub background: bool,

    /// Override the wall-clock budget, in seconds.
    #[arg(long, value_name = "SECS")]
    pub budget_secs: Option<u64>,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let config = load_config(&home)?;
        let trigger = if self.background {
            TriggerKind::Background
        } else {
            TriggerKind::Interactive
        };
        let limit = self
            .budget_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.budgets.for_trigger(trigger));
        tracing::debug!(%trigger, budget_secs = limit.as_secs(), "starting sync");

        let collaborators = Collaborators::from_config(&config, &home);
        let engine = collaborators.engine();
        let report = block_on(engine.commit_within(&config, trigger, limit))?
            .context("sync failed")?;

        run_store::save_last_at(&home, &report).context("failed to record run report")?;

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

pub(crate) fn print_report(report: &RunReport) {
    let mark = if report.is_clean() {
        "✓".green().bold()
    } else {
        "!".yellow().bold()
    };
    println!("{mark} {report}");
    println!(
        "  {} run, started {}, took {} ms",
        report.trigger,
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.duration_ms
    );
    if report.timed_out {
        println!(
            "  {}",
            "budget exhausted: remaining records and deactivations wait for the next run".yellow()
        );
    }
    for err in &report.office_errors {
        println!("  {} {err}", "office:".yellow());
    }
    for err in &report.errors {
        println!("  {} {err}", "error:".red());
    }
}
