//! Collaborator boundaries.
//!
//! The engine talks to the outside world only through these traits. Every
//! implementation must hand the engine already-validated domain types; loose
//! payload decoding belongs on the far side of the trait.

use async_trait::async_trait;

use roster_core::{AgentRecord, AssetRef, NewRosterEntry, RosterEntry, RosterEntryId, RosterPatch};

use crate::error::CollaboratorError;

/// Read access to the authoritative agent directory.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Agents of the office identified by `selector` (an office ID or a name
    /// fragment). Records may lack names; the engine filters those.
    async fn fetch_office(&self, selector: &str) -> Result<Vec<AgentRecord>, CollaboratorError>;
}

/// Read access to the roster.
#[async_trait]
pub trait RosterReader: Send + Sync {
    /// Every entry carrying a `syncOrigin` marker, with fields and overrides.
    async fn managed_entries(&self) -> Result<Vec<RosterEntry>, CollaboratorError>;
}

/// Write access to the roster. Each call is atomic.
#[async_trait]
pub trait RosterWriter: Send + Sync {
    /// Store a new document and return its identity.
    async fn create(&self, entry: &NewRosterEntry) -> Result<RosterEntryId, CollaboratorError>;

    /// Apply a partial update to an existing document.
    async fn patch(&self, id: &RosterEntryId, patch: &RosterPatch) -> Result<(), CollaboratorError>;
}

/// Transfers a remote image into the content store's asset space.
#[async_trait]
pub trait PhotoUploader: Send + Sync {
    /// `url` is already normalised to an absolute `https://`/`http://` URL.
    async fn upload(&self, url: &str) -> Result<AssetRef, CollaboratorError>;
}
