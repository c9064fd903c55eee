//! `roster preview`: planned creates, updates and deactivations.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use roster_adapters::Collaborators;
use roster_sync::{Action, Change, Decision, Preview};

use super::{block_on, home, load_config};

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PreviewArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let config = load_config(&home)?;
        let collaborators = Collaborators::from_config(&config, &home);
        let engine = collaborators.engine();
        let preview = block_on(engine.preview(&config))?.context("preview failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&preview).context("failed to serialize preview JSON")?
            );
            return Ok(());
        }
        print_tables(&preview);
        Ok(())
    }
}

#[derive(Tabled)]
struct CreateRow {
    #[tabled(rename = "agent")]
    agent: String,
    #[tabled(rename = "canonical id")]
    canonical_id: String,
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "photo")]
    photo: String,
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "agent")]
    agent: String,
    #[tabled(rename = "entry")]
    entry: String,
    #[tabled(rename = "fields")]
    fields: String,
    #[tabled(rename = "reason")]
    reason: String,
}

fn print_tables(preview: &Preview) {
    let summary = preview.plan.summary();
    println!(
        "Preview at {} | {} create | {} update | {} skip | {} deactivate",
        preview.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.create.to_string().green().bold(),
        summary.update.to_string().yellow().bold(),
        summary.skip,
        summary.deactivate.to_string().red().bold(),
    );
    for err in &preview.office_errors {
        println!("{} {err}", "office failed:".yellow());
    }
    for name in &preview.plan.unidentified {
        println!("{} {name}", "no identifier:".yellow());
    }

    let creates: Vec<CreateRow> = preview
        .plan
        .with_action(Action::Create)
        .filter_map(create_row)
        .collect();
    if !creates.is_empty() {
        println!("{}", "CREATE".green().bold());
        print_table(Table::new(creates));
    }

    let updates: Vec<ChangeRow> = preview
        .plan
        .with_action(Action::Update)
        .map(change_row)
        .collect();
    if !updates.is_empty() {
        println!("{}", "UPDATE".yellow().bold());
        print_table(Table::new(updates));
    }

    let deactivations: Vec<ChangeRow> = preview
        .plan
        .with_action(Action::Deactivate)
        .map(change_row)
        .collect();
    if !deactivations.is_empty() {
        println!("{}", "DEACTIVATE".red().bold());
        print_table(Table::new(deactivations));
    }

    if summary.create + summary.update + summary.deactivate == 0 {
        println!("Roster is up to date.");
    }
}

fn print_table(mut table: Table) {
    table.with(Style::rounded());
    println!("{table}");
}

fn create_row(d: &Decision) -> Option<CreateRow> {
    let Change::Create { entry } = &d.change else {
        return None;
    };
    Some(CreateRow {
        agent: d.label.clone(),
        canonical_id: d.canonical_id.to_string(),
        slug: entry.slug.clone(),
        photo: d
            .photo
            .as_ref()
            .map(|p| p.url.clone())
            .unwrap_or_else(|| "-".into()),
    })
}

fn change_row(d: &Decision) -> ChangeRow {
    let (entry, fields) = match &d.change {
        Change::Update { id, patch } | Change::Deactivate { id, patch } => {
            let mut names: Vec<String> = patch.fields.keys().map(|f| f.to_string()).collect();
            if let Some(active) = patch.active {
                names.push(format!("active={active}"));
            }
            names.extend(patch.overrides.keys().map(|k| format!("lock:{k}")));
            if d.photo.is_some() {
                names.push("photo".into());
            }
            (id.to_string(), names.join(", "))
        }
        Change::Create { .. } | Change::Skip { .. } => (String::new(), String::new()),
    };
    ChangeRow {
        agent: d.label.clone(),
        entry,
        fields,
        reason: d.reason.clone(),
    }
}
