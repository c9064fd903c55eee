#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use roster_core::{
    AgentRecord, AssetRef, CanonicalId, DirectorySource, NewRosterEntry, PersonName, Phones,
    RosterEntry, RosterEntryId, RosterPatch, SourceIds, SyncConfig,
};
use roster_sync::{AgentDirectory, CollaboratorError, PhotoUploader, RosterReader, RosterWriter};

pub fn agent(id: &str, first: &str, last: &str) -> AgentRecord {
    AgentRecord {
        ids: SourceIds {
            staff_id: id.into(),
            ..Default::default()
        },
        name: PersonName {
            first: first.into(),
            last: last.into(),
        },
        ..Default::default()
    }
}

pub fn agent_with(id: &str, first: &str, last: &str, email: &str, phone: &str) -> AgentRecord {
    AgentRecord {
        email: email.into(),
        phones: Phones {
            business: phone.into(),
            ..Default::default()
        },
        ..agent(id, first, last)
    }
}

pub fn config(offices: &[&str]) -> SyncConfig {
    SyncConfig::new(
        offices.iter().map(|o| o.to_string()).collect(),
        DirectorySource::File {
            path: PathBuf::from("unused.json"),
        },
    )
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct StaticDirectory {
    offices: Mutex<BTreeMap<String, Vec<AgentRecord>>>,
    failing: Mutex<BTreeSet<String>>,
}

impl StaticDirectory {
    pub fn with_office(self, office: &str, agents: Vec<AgentRecord>) -> Self {
        self.set_office(office, agents);
        self
    }

    pub fn set_office(&self, office: &str, agents: Vec<AgentRecord>) {
        self.offices
            .lock()
            .unwrap()
            .insert(office.to_string(), agents);
    }

    pub fn fail_office(&self, office: &str) {
        self.failing.lock().unwrap().insert(office.to_string());
    }
}

#[async_trait]
impl AgentDirectory for StaticDirectory {
    async fn fetch_office(&self, selector: &str) -> Result<Vec<AgentRecord>, CollaboratorError> {
        if self.failing.lock().unwrap().contains(selector) {
            return Err(CollaboratorError::Unavailable {
                service: "directory",
                message: format!("office {selector} timed out"),
            });
        }
        Ok(self
            .offices
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryRoster {
    entries: Mutex<Vec<RosterEntry>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
    reads: AtomicUsize,
    failing_names: Mutex<BTreeSet<String>>,
    unavailable: Mutex<bool>,
    write_delay: Mutex<Option<Duration>>,
}

impl MemoryRoster {
    pub fn with_entry(self, entry: RosterEntry) -> Self {
        self.entries.lock().unwrap().push(entry);
        self
    }

    pub fn fail_writes_for(&self, name: &str) {
        self.failing_names.lock().unwrap().insert(name.to_string());
    }

    pub fn make_unavailable(&self) {
        *self.unavailable.lock().unwrap() = true;
    }

    pub fn slow_writes(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = Some(delay);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn all(&self) -> Vec<RosterEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn by_canonical(&self, id: &str) -> Option<RosterEntry> {
        self.all()
            .into_iter()
            .find(|e| e.is_managed() && e.canonical_id == Some(CanonicalId::from(id)))
    }

    pub fn by_id(&self, id: &str) -> Option<RosterEntry> {
        self.all()
            .into_iter()
            .find(|e| e.id == RosterEntryId::from(id))
    }

    async fn before_write(&self, name: &str) -> Result<(), CollaboratorError> {
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_names.lock().unwrap().contains(name) {
            return Err(CollaboratorError::Rejected {
                service: "roster",
                message: "validation failed".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RosterReader for MemoryRoster {
    async fn managed_entries(&self) -> Result<Vec<RosterEntry>, CollaboratorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if *self.unavailable.lock().unwrap() {
            return Err(CollaboratorError::Unavailable {
                service: "roster",
                message: "connection refused".into(),
            });
        }
        // Returns manual entries too; the engine must ignore them.
        Ok(self.all())
    }
}

#[async_trait]
impl RosterWriter for MemoryRoster {
    async fn create(&self, entry: &NewRosterEntry) -> Result<RosterEntryId, CollaboratorError> {
        let name = entry.fields.name.clone().unwrap_or_default();
        self.before_write(&name).await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = RosterEntryId::from(format!("created-{n}"));
        self.entries
            .lock()
            .unwrap()
            .push(entry.clone().into_entry(id.clone()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn patch(&self, id: &RosterEntryId, patch: &RosterPatch) -> Result<(), CollaboratorError> {
        let name = self
            .by_id(&id.0)
            .and_then(|e| e.fields.name.clone())
            .unwrap_or_default();
        self.before_write(&name).await?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| CollaboratorError::Rejected {
                service: "roster",
                message: format!("no document {id}"),
            })?;
        patch.apply_to(entry);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Photos
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingUploader {
    calls: Mutex<Vec<String>>,
}

impl RecordingUploader {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoUploader for RecordingUploader {
    async fn upload(&self, url: &str) -> Result<AssetRef, CollaboratorError> {
        self.calls.lock().unwrap().push(url.to_string());
        if url.contains("broken") {
            return Err(CollaboratorError::Rejected {
                service: "photo",
                message: "HTTP 404".into(),
            });
        }
        let name = url.rsplit('/').next().unwrap_or("photo");
        Ok(AssetRef::from(format!("image-{name}")))
    }
}
