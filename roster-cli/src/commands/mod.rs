pub mod config;
pub mod init;
pub mod preview;
pub mod report;
pub mod sync;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};

use roster_core::{config as roster_config, SyncConfig};

pub(crate) fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

pub(crate) fn load_config(home: &std::path::Path) -> Result<SyncConfig> {
    roster_config::load_at(home).context("failed to load sync configuration")
}

/// Drive one async command to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(fut))
}
