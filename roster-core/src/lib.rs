//! Roster core library: domain types, sync configuration, errors.
//!
//! - [`types`]: directory records, roster entries, patches
//! - [`config`]: [`SyncConfig`] load / save / init
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Budgets, DirectorySource, SyncConfig, TriggerKind};
pub use error::ConfigError;
pub use types::{
    AgentRecord, AssetRef, CanonicalId, Field, NewRosterEntry, OfficeAddress, Overrides,
    PersonName, Phones, RosterEntry, RosterEntryId, RosterFields, RosterPatch, SourceIds,
    SYNC_ORIGIN,
};
