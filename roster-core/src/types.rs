//! Domain types for the team roster and the agent directory.
//!
//! Directory-side values ([`AgentRecord`]) use plain `String`s where an empty
//! string means "absent"; adapters normalise missing and blank source values to
//! `""` before a record reaches the engine. Roster-side values
//! ([`RosterFields`]) use `Option<String>` because the content store
//! distinguishes an unset field from an empty one.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of `syncOrigin` on every roster entry the engine creates.
pub const SYNC_ORIGIN: &str = "agent-directory";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identity of an agent, derived from the directory's identifier fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalId(pub String);

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CanonicalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CanonicalId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Content-store identity of a roster entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RosterEntryId(pub String);

impl fmt::Display for RosterEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RosterEntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RosterEntryId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque reference to an uploaded image asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef(pub String);

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AssetRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AssetRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Directory side
// ---------------------------------------------------------------------------

/// The identifier fields a directory row may carry, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceIds {
    #[serde(default)]
    pub staff_id: String,
    #[serde(default)]
    pub entity_id: String,
    #[serde(default)]
    pub row_id: String,
}

impl SourceIds {
    /// All non-blank identifiers, most preferred first, without repeats.
    pub fn candidates(&self) -> Vec<CanonicalId> {
        let mut out: Vec<CanonicalId> = Vec::with_capacity(3);
        for raw in [&self.staff_id, &self.entity_id, &self.row_id] {
            let trimmed = raw.trim();
            if trimmed.is_empty() || out.iter().any(|c| c.0 == trimmed) {
                continue;
            }
            out.push(CanonicalId::from(trimmed));
        }
        out
    }

    /// The first non-blank of staff ID, entity ID, row ID.
    pub fn canonical(&self) -> Option<CanonicalId> {
        self.candidates().into_iter().next()
    }
}

/// First and last name as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

impl PersonName {
    /// `"{first} {last}"`, trimmed.
    pub fn full(&self) -> String {
        format!("{} {}", self.first.trim(), self.last.trim())
            .trim()
            .to_string()
    }

    /// Both halves are non-blank.
    pub fn is_complete(&self) -> bool {
        !self.first.trim().is_empty() && !self.last.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Phones {
    #[serde(default)]
    pub business: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub office: String,
}

/// Structured office address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OfficeAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
}

impl OfficeAddress {
    /// Single-line rendering: `"street, city, ST zip"`, skipping blank parts.
    pub fn formatted(&self) -> String {
        let region = [self.state.trim(), self.postal_code.trim()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [self.street.trim(), self.city.trim(), region.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A snapshot of one agent from the external directory.
///
/// Produced fresh by the directory adapter on every run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentRecord {
    pub ids: SourceIds,
    pub name: PersonName,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phones: Phones,
    #[serde(default)]
    pub office_name: String,
    #[serde(default)]
    pub office_address: OfficeAddress,
    #[serde(default)]
    pub bio: String,
    /// Raw photo URL; may be protocol-relative or lack a scheme.
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub license_ids: Vec<String>,
    #[serde(default)]
    pub specialty: String,
}

impl AgentRecord {
    pub fn canonical_id(&self) -> Option<CanonicalId> {
        self.ids.canonical()
    }

    /// First non-blank license identifier, or `""`.
    pub fn primary_license(&self) -> &str {
        self.license_ids
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Roster side
// ---------------------------------------------------------------------------

/// A roster field the engine may write.
///
/// The serialized name doubles as the key in [`Overrides`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Bio,
    Email,
    Phone,
    Mobile,
    Office,
    Address,
    Title,
    LicenseId,
    PhotoRef,
    PhotoSourceUrl,
}

impl Field {
    /// Every writable field, in display order.
    pub const ALL: [Field; 11] = [
        Field::Name,
        Field::Bio,
        Field::Email,
        Field::Phone,
        Field::Mobile,
        Field::Office,
        Field::Address,
        Field::Title,
        Field::LicenseId,
        Field::PhotoRef,
        Field::PhotoSourceUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Bio => "bio",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Mobile => "mobile",
            Field::Office => "office",
            Field::Address => "address",
            Field::Title => "title",
            Field::LicenseId => "licenseId",
            Field::PhotoRef => "photoRef",
            Field::PhotoSourceUrl => "photoSourceUrl",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown roster field '{s}'"))
    }
}

/// Field values stored on a roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_source_url: Option<String>,
}

impl RosterFields {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Bio => &mut self.bio,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Mobile => &mut self.mobile,
            Field::Office => &mut self.office,
            Field::Address => &mut self.address,
            Field::Title => &mut self.title,
            Field::LicenseId => &mut self.license_id,
            Field::PhotoRef => &mut self.photo_ref,
            Field::PhotoSourceUrl => &mut self.photo_source_url,
        }
    }

    /// Stored value, with an unset field read as `""`.
    pub fn get(&self, field: Field) -> &str {
        let value = match field {
            Field::Name => &self.name,
            Field::Bio => &self.bio,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Mobile => &self.mobile,
            Field::Office => &self.office,
            Field::Address => &self.address,
            Field::Title => &self.title,
            Field::LicenseId => &self.license_id,
            Field::PhotoRef => &self.photo_ref,
            Field::PhotoSourceUrl => &self.photo_source_url,
        };
        value.as_deref().unwrap_or("")
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = Some(value.into());
    }
}

/// Per-field "an editor changed this" flags.
///
/// Keys are [`Field`] names. The key [`Overrides::ACTIVE`] is reserved: it is
/// not a field but the sticky-deactivation lock. Once set, the engine treats
/// the entry's `active = false` as permanent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(pub BTreeMap<String, bool>);

impl Overrides {
    /// Reserved key locking a deactivation.
    pub const ACTIVE: &'static str = "active";

    pub fn is_set(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// The editor owns `field`; the engine must not write it.
    pub fn protects(&self, field: Field) -> bool {
        self.is_set(field.as_str())
    }

    pub fn active_locked(&self) -> bool {
        self.is_set(Self::ACTIVE)
    }

    pub fn set(&mut self, key: impl Into<String>, value: bool) {
        self.0.insert(key.into(), value);
    }
}

/// A public team-member profile in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: RosterEntryId,
    /// Set only on engine-managed entries. Entries without it are never touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<CanonicalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub fields: RosterFields,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub overrides: Overrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl RosterEntry {
    /// Carries a non-blank `syncOrigin` marker.
    pub fn is_managed(&self) -> bool {
        self.sync_origin
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// A complete document for a roster entry that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRosterEntry {
    pub sync_origin: String,
    pub canonical_id: CanonicalId,
    pub slug: String,
    pub display_order: i64,
    pub fields: RosterFields,
    pub active: bool,
    pub overrides: Overrides,
    pub last_synced_at: DateTime<Utc>,
}

impl NewRosterEntry {
    /// Materialise the document under the identity the store assigned.
    pub fn into_entry(self, id: RosterEntryId) -> RosterEntry {
        RosterEntry {
            id,
            sync_origin: Some(self.sync_origin),
            canonical_id: Some(self.canonical_id),
            slug: Some(self.slug),
            display_order: Some(self.display_order),
            fields: self.fields,
            active: self.active,
            overrides: self.overrides,
            last_synced_at: Some(self.last_synced_at),
        }
    }
}

/// A partial update to one roster entry.
///
/// Stores must apply a patch atomically: all of it or none of it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPatch {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<Field, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl RosterPatch {
    /// Changes anything besides `lastSyncedAt`.
    pub fn has_changes(&self) -> bool {
        !self.fields.is_empty() || self.active.is_some() || !self.overrides.is_empty()
    }

    pub fn apply_to(&self, entry: &mut RosterEntry) {
        for (field, value) in &self.fields {
            entry.fields.set(*field, value.clone());
        }
        if let Some(active) = self.active {
            entry.active = active;
        }
        for (key, value) in &self.overrides {
            entry.overrides.set(key.clone(), *value);
        }
        if let Some(at) = self.last_synced_at {
            entry.last_synced_at = Some(at);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
