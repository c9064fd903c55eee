//! Directory fetch and roster snapshot loading.

use roster_core::{AgentRecord, RosterEntry};

use crate::error::{CollaboratorError, SyncError};
use crate::ports::{AgentDirectory, RosterReader};

/// Agents gathered across all configured offices.
#[derive(Debug, Default)]
pub struct DirectoryFetch {
    /// Records with complete names, in office order then directory order.
    /// May still contain the same agent more than once.
    pub agents: Vec<AgentRecord>,
    /// One `"<office>: <error>"` line per office that failed.
    pub office_errors: Vec<String>,
}

/// Fetch every office in turn. A failing office contributes no records and
/// does not stop the others; only a total failure is fatal.
pub async fn fetch_agents(
    directory: &dyn AgentDirectory,
    offices: &[String],
) -> Result<DirectoryFetch, SyncError> {
    let mut fetch = DirectoryFetch::default();
    let mut last_error: Option<CollaboratorError> = None;

    for office in offices {
        match directory.fetch_office(office).await {
            Ok(records) => {
                let total = records.len();
                let before = fetch.agents.len();
                fetch
                    .agents
                    .extend(records.into_iter().filter(|r| r.name.is_complete()));
                let kept = fetch.agents.len() - before;
                if kept < total {
                    tracing::debug!(office = %office, dropped = total - kept, "dropped records without a full name");
                }
                tracing::debug!(office = %office, agents = kept, "office fetched");
            }
            Err(err) => {
                tracing::warn!(office = %office, error = %err, "office fetch failed");
                fetch.office_errors.push(format!("{office}: {err}"));
                last_error = Some(err);
            }
        }
    }

    if !offices.is_empty() && fetch.office_errors.len() == offices.len() {
        return Err(SyncError::DirectoryUnreachable {
            offices: offices.len(),
            last: last_error.map(|e| e.to_string()).unwrap_or_default(),
        });
    }
    Ok(fetch)
}

/// Load the engine-managed part of the roster.
///
/// Entries without a `syncOrigin` marker are discarded even if the reader
/// returns them.
pub async fn load_snapshot(reader: &dyn RosterReader) -> Result<Vec<RosterEntry>, SyncError> {
    let entries = reader
        .managed_entries()
        .await
        .map_err(SyncError::RosterUnavailable)?;
    Ok(entries.into_iter().filter(RosterEntry::is_managed).collect())
}
