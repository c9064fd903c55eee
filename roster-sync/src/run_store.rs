//! Last-run persistence.
//!
//! Persists the most recent [`RunReport`] at `<home>/.roster/runs/last.json`.
//! Writes use the same atomic `.tmp` + rename pattern as the config.

use std::path::{Path, PathBuf};

use roster_core::config::roster_root;

use crate::error::{io_err, SyncError};
use crate::report::RunReport;

/// `<home>/.roster/runs/last.json`
pub fn last_report_path_at(home: &Path) -> PathBuf {
    roster_root(home).join("runs").join("last.json")
}

/// Load the last report, or `None` if no run has been recorded yet.
pub fn load_last_at(home: &Path) -> Result<Option<RunReport>, SyncError> {
    let path = last_report_path_at(home);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Replace the last report atomically.
pub fn save_last_at(home: &Path, report: &RunReport) -> Result<(), SyncError> {
    let path = last_report_path_at(home);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid run report path"),
        ));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(report)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}
