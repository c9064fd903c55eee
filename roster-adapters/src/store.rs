//! JSON-file roster store.
//!
//! The whole roster (managed and manual entries) lives in one JSON array.
//! Every write reloads the file, applies one change and rewrites it with the
//! atomic `.tmp` + rename pattern, so a crash mid-run never leaves a torn
//! document and every create/patch is all-or-nothing.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use roster_core::{CanonicalId, NewRosterEntry, RosterEntry, RosterEntryId, RosterPatch};
use roster_sync::{CollaboratorError, RosterReader, RosterWriter};

use crate::error::{io_err, AdapterError};

/// Deterministic entry ID: `teamMember-` plus the first 16 hex digits of
/// SHA-256 over the canonical ID.
pub fn entry_id_for(canonical_id: &CanonicalId) -> RosterEntryId {
    let mut h = Sha256::new();
    h.update(canonical_id.0.as_bytes());
    let digest = hex::encode(h.finalize());
    RosterEntryId::from(format!("teamMember-{}", &digest[..16]))
}

pub struct JsonRosterStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonRosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry in the document, managed or not. A missing file is an
    /// empty roster.
    pub async fn load_all(&self) -> Result<Vec<RosterEntry>, AdapterError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.path, e)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|e| AdapterError::Decode {
            what: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    async fn save_all(&self, entries: &[RosterEntry]) -> Result<(), AdapterError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_err(dir, e))?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|e| AdapterError::Decode {
            what: "roster entries".into(),
            message: e.to_string(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_err(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }

    async fn insert(&self, entry: &NewRosterEntry) -> Result<RosterEntryId, AdapterError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_all().await?;
        let id = entry_id_for(&entry.canonical_id);
        if entries.iter().any(|e| e.id == id) {
            return Err(AdapterError::DuplicateEntry(id.0));
        }
        entries.push(entry.clone().into_entry(id.clone()));
        self.save_all(&entries).await?;
        Ok(id)
    }

    async fn update(&self, id: &RosterEntryId, patch: &RosterPatch) -> Result<(), AdapterError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_all().await?;
        let entry = entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| AdapterError::UnknownEntry(id.0.clone()))?;
        patch.apply_to(entry);
        self.save_all(&entries).await
    }
}

#[async_trait]
impl RosterReader for JsonRosterStore {
    async fn managed_entries(&self) -> Result<Vec<RosterEntry>, CollaboratorError> {
        let entries = self.load_all().await?;
        Ok(entries.into_iter().filter(RosterEntry::is_managed).collect())
    }
}

#[async_trait]
impl RosterWriter for JsonRosterStore {
    async fn create(&self, entry: &NewRosterEntry) -> Result<RosterEntryId, CollaboratorError> {
        Ok(self.insert(entry).await?)
    }

    async fn patch(&self, id: &RosterEntryId, patch: &RosterPatch) -> Result<(), CollaboratorError> {
        Ok(self.update(id, patch).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_ids_are_stable_and_prefixed() {
        let a = entry_id_for(&CanonicalId::from("A1"));
        let b = entry_id_for(&CanonicalId::from("A1"));
        let c = entry_id_for(&CanonicalId::from("A2"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.0.starts_with("teamMember-"));
        assert_eq!(a.0.len(), "teamMember-".len() + 16);
    }
}
