//! `roster config show|path`

use anyhow::{Context, Result};
use clap::Subcommand;

use roster_core::{config, DirectorySource};

use super::{home, load_config};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (API keys redacted).
    Show {
        /// Emit JSON instead of YAML.
        #[arg(long)]
        json: bool,
    },
    /// Print the configuration file path.
    Path,
}

pub fn run(command: ConfigCommand) -> Result<()> {
    let home = home()?;
    match command {
        ConfigCommand::Path => {
            println!("{}", config::config_path_at(&home).display());
        }
        ConfigCommand::Show { json } => {
            let mut cfg = load_config(&home)?;
            if let DirectorySource::Http { api_key, .. } = &mut cfg.directory {
                if api_key.is_some() {
                    *api_key = Some("********".into());
                }
            }
            // Resolve defaults so the output shows where data actually lives.
            cfg.roster_path = Some(cfg.roster_path_at(&home));
            cfg.assets_dir = Some(cfg.assets_dir_at(&home));

            let rendered = if json {
                serde_json::to_string_pretty(&cfg).context("failed to serialize config JSON")?
            } else {
                serde_yaml::to_string(&cfg).context("failed to serialize config YAML")?
            };
            println!("{}", rendered.trim_end());
        }
    }
    Ok(())
}
