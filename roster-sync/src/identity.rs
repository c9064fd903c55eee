//! Identity resolution: dedup directory records and pair them with roster
//! entries.
//!
//! A record's canonical ID is its first non-blank identifier (staff, entity,
//! row). Matching is alias-aware: an entry matches when its stored
//! `canonicalId` equals *any* of the record's identifiers, tried in preference
//! order. An entry created while an agent only had a row ID therefore keeps
//! matching after the directory backfills a staff ID. The stored ID is never
//! rewritten.

use std::collections::{BTreeMap, BTreeSet};

use roster_core::{AgentRecord, CanonicalId, RosterEntry};

/// One directory agent and the roster entry it resolved to, if any.
#[derive(Debug, Clone)]
pub struct Pairing {
    pub canonical_id: CanonicalId,
    pub agent: AgentRecord,
    pub entry: Option<RosterEntry>,
}

#[derive(Debug, Default)]
pub struct Resolution {
    /// One pairing per distinct agent, in first-seen order.
    pub pairings: Vec<Pairing>,
    /// Managed entries none of whose identity appears in the directory.
    pub absent: Vec<RosterEntry>,
    /// Full names of records carrying no identifier at all.
    pub unidentified: Vec<String>,
}

/// Drop records sharing a canonical ID, keeping the first encountered.
///
/// Returns the survivors and the names of records with no identifier.
pub fn dedup(agents: Vec<AgentRecord>) -> (Vec<(CanonicalId, AgentRecord)>, Vec<String>) {
    let mut seen = BTreeSet::new();
    let mut unique = Vec::with_capacity(agents.len());
    let mut unidentified = Vec::new();

    for agent in agents {
        let Some(id) = agent.canonical_id() else {
            tracing::warn!(agent = %agent.name.full(), "directory record has no identifier");
            unidentified.push(agent.name.full());
            continue;
        };
        if seen.insert(id.clone()) {
            unique.push((id, agent));
        } else {
            tracing::debug!(canonical_id = %id, "duplicate directory record skipped");
        }
    }
    (unique, unidentified)
}

/// Pair deduplicated agents with managed roster entries.
pub fn resolve(agents: Vec<AgentRecord>, entries: Vec<RosterEntry>) -> Resolution {
    let (unique, unidentified) = dedup(agents);

    let mut slots: Vec<Option<RosterEntry>> = Vec::with_capacity(entries.len());
    let mut by_id: BTreeMap<CanonicalId, usize> = BTreeMap::new();
    let mut orphans = Vec::new();

    for entry in entries.into_iter().filter(RosterEntry::is_managed) {
        let Some(id) = entry.canonical_id.clone() else {
            tracing::warn!(entry = %entry.id, "managed roster entry has no canonical id; ignored");
            continue;
        };
        if by_id.contains_key(&id) {
            tracing::warn!(entry = %entry.id, canonical_id = %id, "duplicate managed roster entry; only the first is synced");
            orphans.push(entry);
            continue;
        }
        by_id.insert(id, slots.len());
        slots.push(Some(entry));
    }

    let mut present: BTreeSet<CanonicalId> = BTreeSet::new();
    let mut pairings = Vec::with_capacity(unique.len());

    for (canonical_id, agent) in unique {
        let candidates = agent.ids.candidates();
        let entry = candidates
            .iter()
            .filter_map(|c| by_id.get(c).copied())
            .find_map(|idx| slots[idx].take());
        present.extend(candidates);
        pairings.push(Pairing {
            canonical_id,
            agent,
            entry,
        });
    }

    // Unclaimed entries, plus duplicates, are absent only when their identity
    // no longer appears anywhere in the directory fetch.
    let absent = slots
        .into_iter()
        .flatten()
        .chain(orphans)
        .filter(|e| e.canonical_id.as_ref().map_or(false, |id| !present.contains(id)))
        .collect();

    Resolution {
        pairings,
        absent,
        unidentified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{PersonName, RosterEntryId, SourceIds, SYNC_ORIGIN};

    fn agent(staff: &str, row: &str, first: &str) -> AgentRecord {
        AgentRecord {
            ids: SourceIds {
                staff_id: staff.into(),
                entity_id: String::new(),
                row_id: row.into(),
            },
            name: PersonName {
                first: first.into(),
                last: "Agent".into(),
            },
            ..Default::default()
        }
    }

    fn entry(doc: &str, canonical: &str) -> RosterEntry {
        RosterEntry {
            id: RosterEntryId::from(doc),
            sync_origin: Some(SYNC_ORIGIN.into()),
            canonical_id: Some(CanonicalId::from(canonical)),
            slug: None,
            display_order: None,
            fields: Default::default(),
            active: true,
            overrides: Default::default(),
            last_synced_at: None,
        }
    }

    #[test]
    fn dedup_keeps_first_record_per_agent() {
        let (unique, unidentified) = dedup(vec![
            agent("S1", "", "North"),
            agent("S2", "", "Other"),
            agent("S1", "", "South"),
        ]);
        assert!(unidentified.is_empty());
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].1.name.first, "North");
    }

    #[test]
    fn records_without_any_identifier_are_reported() {
        let (unique, unidentified) = dedup(vec![agent("", "", "Ghost")]);
        assert!(unique.is_empty());
        assert_eq!(unidentified, vec!["Ghost Agent".to_string()]);
    }

    #[test]
    fn pairs_by_canonical_id_and_reports_absent() {
        let r = resolve(
            vec![agent("A1", "", "Jane"), agent("A3", "", "New")],
            vec![entry("doc-1", "A1"), entry("doc-2", "A2")],
        );
        assert_eq!(r.pairings.len(), 2);
        assert_eq!(
            r.pairings[0].entry.as_ref().map(|e| e.id.clone()),
            Some(RosterEntryId::from("doc-1"))
        );
        assert!(r.pairings[1].entry.is_none());
        assert_eq!(r.absent.len(), 1);
        assert_eq!(r.absent[0].id, RosterEntryId::from("doc-2"));
    }

    #[test]
    fn backfilled_staff_id_still_matches_row_id_entry() {
        let r = resolve(vec![agent("S9", "R9", "Late")], vec![entry("doc-9", "R9")]);
        assert_eq!(r.pairings[0].canonical_id, CanonicalId::from("S9"));
        assert_eq!(
            r.pairings[0].entry.as_ref().map(|e| e.id.clone()),
            Some(RosterEntryId::from("doc-9"))
        );
        assert!(r.absent.is_empty());
    }

    #[test]
    fn duplicate_entry_for_present_agent_is_not_absent() {
        let r = resolve(
            vec![agent("A1", "", "Jane")],
            vec![entry("doc-1", "A1"), entry("doc-1b", "A1")],
        );
        assert!(r.pairings[0].entry.is_some());
        assert!(r.absent.is_empty());
    }

    #[test]
    fn unmanaged_entries_never_pair() {
        let mut manual = entry("manual", "A1");
        manual.sync_origin = None;
        let r = resolve(vec![agent("A1", "", "Jane")], vec![manual]);
        assert!(r.pairings[0].entry.is_none());
        assert!(r.absent.is_empty());
    }
}
