//! Override-aware field merging.
//!
//! For each field the rule is
//! `write = !overridden && source != "" && source != existing`,
//! evaluated independently, so a profile with an editor-owned bio still
//! receives phone updates. Pure: no I/O, no clock.

use std::collections::BTreeMap;

use roster_core::{AgentRecord, Field, RosterEntry};

/// Directory values for every merged field, trimmed. Photo fields are not
/// included; they go through [`crate::photo`].
pub fn source_fields(agent: &AgentRecord) -> BTreeMap<Field, String> {
    let phone = first_non_blank(&[&agent.phones.business, &agent.phones.office]);
    let values = [
        (Field::Name, agent.name.full()),
        (Field::Bio, agent.bio.trim().to_string()),
        (Field::Email, agent.email.trim().to_string()),
        (Field::Phone, phone),
        (Field::Mobile, agent.phones.mobile.trim().to_string()),
        (Field::Office, agent.office_name.trim().to_string()),
        (Field::Address, agent.office_address.formatted()),
        (Field::Title, agent.specialty.trim().to_string()),
        (Field::LicenseId, agent.primary_license().to_string()),
    ];
    values.into_iter().collect()
}

/// Minimal set of field writes for `agent` against `existing`.
///
/// With no existing entry every non-empty source field is returned.
pub fn merge(agent: &AgentRecord, existing: Option<&RosterEntry>) -> BTreeMap<Field, String> {
    source_fields(agent)
        .into_iter()
        .filter(|(field, value)| should_write(*field, value, existing))
        .collect()
}

fn should_write(field: Field, value: &str, existing: Option<&RosterEntry>) -> bool {
    if value.is_empty() {
        return false;
    }
    match existing {
        None => true,
        Some(entry) => !entry.overrides.protects(field) && entry.fields.get(field) != value,
    }
}

fn first_non_blank(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or("")
        .to_string()
}
