//! Reconciliation planning.
//!
//! Turns a [`Resolution`] into one [`Decision`] per agent (Create, Update or
//! Skip) plus one per absent roster entry that still needs a write
//! (Deactivate). Planning is pure: the clock is passed in, photos are only
//! flagged, nothing is written. Preview and commit share this code path.

use chrono::{DateTime, Utc};
use serde::Serialize;

use roster_core::{
    CanonicalId, Field, NewRosterEntry, Overrides, RosterEntry, RosterEntryId, RosterFields,
    RosterPatch, SYNC_ORIGIN,
};

use crate::identity::{Pairing, Resolution};
use crate::merge::merge;
use crate::photo::{photo_change, PhotoChange};
use crate::slug::slugify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Skip,
    Deactivate,
}

/// What will be written for one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Change {
    Create { entry: NewRosterEntry },
    Update { id: RosterEntryId, patch: RosterPatch },
    Skip { id: RosterEntryId },
    Deactivate { id: RosterEntryId, patch: RosterPatch },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub canonical_id: CanonicalId,
    /// Agent or entry name, used in reports.
    pub label: String,
    pub change: Change,
    /// Pending photo upload, resolved at execution time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoChange>,
    pub reason: String,
}

impl Decision {
    pub fn action(&self) -> Action {
        match self.change {
            Change::Create { .. } => Action::Create,
            Change::Update { .. } => Action::Update,
            Change::Skip { .. } => Action::Skip,
            Change::Deactivate { .. } => Action::Deactivate,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanOptions {
    pub default_order: i64,
    pub now: DateTime<Utc>,
}

/// The full set of decisions for one run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// First pass: one decision per directory agent, in directory order.
    pub upserts: Vec<Decision>,
    /// Second pass: absent entries still needing a write.
    pub deactivations: Vec<Decision>,
    /// Directory records without any identifier.
    pub unidentified: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub skip: usize,
    pub deactivate: usize,
}

impl Plan {
    pub fn summary(&self) -> PlanSummary {
        let mut s = PlanSummary::default();
        for d in self.upserts.iter().chain(&self.deactivations) {
            match d.action() {
                Action::Create => s.create += 1,
                Action::Update => s.update += 1,
                Action::Skip => s.skip += 1,
                Action::Deactivate => s.deactivate += 1,
            }
        }
        s
    }

    pub fn with_action(&self, action: Action) -> impl Iterator<Item = &Decision> {
        self.upserts
            .iter()
            .chain(&self.deactivations)
            .filter(move |d| d.action() == action)
    }
}

/// Plan every pairing and every absent entry.
pub fn plan(resolution: Resolution, opts: &PlanOptions) -> Plan {
    let upserts = resolution
        .pairings
        .iter()
        .map(|p| plan_agent(p, opts))
        .collect();
    let deactivations = resolution.absent.iter().filter_map(plan_absent).collect();
    Plan {
        upserts,
        deactivations,
        unidentified: resolution.unidentified,
    }
}

/// Create, Update or Skip for a directory agent.
pub fn plan_agent(pairing: &Pairing, opts: &PlanOptions) -> Decision {
    let label = pairing.agent.name.full();
    match &pairing.entry {
        None => plan_create(pairing, label, opts),
        Some(existing) => plan_update(pairing, existing, label, opts),
    }
}

fn plan_create(pairing: &Pairing, label: String, opts: &PlanOptions) -> Decision {
    let mut fields = RosterFields::default();
    for (field, value) in merge(&pairing.agent, None) {
        fields.set(field, value);
    }
    // Born hidden and locked: publishing is an editorial decision.
    let mut overrides = Overrides::default();
    overrides.set(Overrides::ACTIVE, true);

    let entry = NewRosterEntry {
        sync_origin: SYNC_ORIGIN.to_string(),
        canonical_id: pairing.canonical_id.clone(),
        slug: slugify(&label),
        display_order: opts.default_order,
        fields,
        active: false,
        overrides,
        last_synced_at: opts.now,
    };
    Decision {
        canonical_id: pairing.canonical_id.clone(),
        label,
        change: Change::Create { entry },
        photo: photo_change(&pairing.agent, None),
        reason: "new in directory".to_string(),
    }
}

fn plan_update(
    pairing: &Pairing,
    existing: &RosterEntry,
    label: String,
    opts: &PlanOptions,
) -> Decision {
    let fields = merge(&pairing.agent, Some(existing));
    let photo = photo_change(&pairing.agent, Some(existing));
    let lock = !existing.active && !existing.overrides.active_locked();

    let mut reasons = Vec::new();
    if !fields.is_empty() {
        let names: Vec<&str> = fields.keys().map(|f| f.as_str()).collect();
        reasons.push(format!("changed: {}", names.join(", ")));
    }
    if photo.is_some() {
        reasons.push("photo changed".to_string());
    }

    let mut patch = RosterPatch {
        fields,
        ..Default::default()
    };
    if lock {
        patch.overrides.insert(Overrides::ACTIVE.to_string(), true);
        reasons.push("locking deactivation".to_string());
    }

    let id = existing.id.clone();
    if !patch.has_changes() && photo.is_none() {
        return Decision {
            canonical_id: pairing.canonical_id.clone(),
            label,
            change: Change::Skip { id },
            photo: None,
            reason: "up to date".to_string(),
        };
    }

    patch.last_synced_at = Some(opts.now);
    Decision {
        canonical_id: pairing.canonical_id.clone(),
        label,
        change: Change::Update { id, patch },
        photo,
        reason: reasons.join("; "),
    }
}

/// Deactivate an entry whose agent left the directory, if anything is left
/// to write. Already inactive and locked entries need nothing.
pub fn plan_absent(entry: &RosterEntry) -> Option<Decision> {
    let locked = entry.overrides.active_locked();
    if !entry.active && locked {
        return None;
    }

    let mut patch = RosterPatch::default();
    let reason = if entry.active {
        patch.active = Some(false);
        "absent from directory"
    } else {
        "absent from directory; locking existing deactivation"
    };
    patch.overrides.insert(Overrides::ACTIVE.to_string(), true);

    Some(Decision {
        canonical_id: entry.canonical_id.clone().unwrap_or_else(|| CanonicalId::from("")),
        label: entry_label(entry),
        change: Change::Deactivate {
            id: entry.id.clone(),
            patch,
        },
        photo: None,
        reason: reason.to_string(),
    })
}

fn entry_label(entry: &RosterEntry) -> String {
    let name = entry.fields.get(Field::Name);
    if name.is_empty() {
        entry.id.to_string()
    } else {
        name.to_string()
    }
}
