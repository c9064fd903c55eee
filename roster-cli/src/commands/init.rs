//! `roster init --office <..> (--directory-file <path> | --directory-url <url>)`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use roster_core::{config, DirectorySource, SyncConfig};

use super::home;

/// Write a fresh sync configuration.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Office ID or case-insensitive office-name fragment. Repeatable.
    #[arg(long = "office", short = 'o', required = true)]
    pub offices: Vec<String>,

    /// Read the directory from a JSON export on disk.
    #[arg(long, conflicts_with = "directory_url", required_unless_present = "directory_url")]
    pub directory_file: Option<PathBuf>,

    /// Read the directory from an HTTP endpoint (`GET <url>?office=<office>`).
    #[arg(long)]
    pub directory_url: Option<String>,

    /// Bearer key sent to the HTTP directory.
    #[arg(long, requires = "directory_url")]
    pub api_key: Option<String>,

    /// Display order given to newly created entries.
    #[arg(long)]
    pub default_order: Option<i64>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let directory = match (self.directory_file, self.directory_url) {
            (Some(path), _) => {
                let path = path
                    .canonicalize()
                    .with_context(|| format!("cannot resolve path '{}'", path.display()))?;
                DirectorySource::File { path }
            }
            (None, Some(url)) => DirectorySource::Http {
                url,
                api_key: self.api_key,
            },
            (None, None) => anyhow::bail!("provide --directory-file or --directory-url"),
        };

        let mut fresh = SyncConfig::new(self.offices, directory);
        if let Some(order) = self.default_order {
            fresh.default_order = order;
        }

        let existed = config::config_path_at(&home).exists();
        let saved = config::init_at(&home, fresh).context("failed to write sync configuration")?;
        if existed {
            println!("· Config already exists; left unchanged");
        } else {
            println!("✓ Wrote sync configuration");
        }
        println!("  Path:    {}", config::config_path_at(&home).display());
        println!("  Offices: {}", saved.offices.join(", "));
        Ok(())
    }
}
