//! Photo reconciliation.
//!
//! Deciding whether a photo changed is pure ([`photo_change`]); performing the
//! transfer is delegated to a [`PhotoUploader`] and only happens while a plan
//! is executed ([`upload`]). Upload failures are soft: the photo fields are
//! simply left out of the write.

use std::collections::BTreeMap;

use serde::Serialize;

use roster_core::{AgentRecord, Field, RosterEntry};

use crate::ports::PhotoUploader;

/// A photo URL that differs from the one the entry was last built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoChange {
    /// Normalised absolute URL.
    pub url: String,
}

/// Give a raw directory photo URL an explicit scheme.
///
/// `//host/p.jpg` becomes `https://host/p.jpg`; a URL without any scheme gets
/// `https://` prepended. Blank input yields `None`.
pub fn normalize_photo_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }
    if let Some(rest) = url.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if has_scheme(url) {
        return Some(url.to_string());
    }
    Some(format!("https://{url}"))
}

fn has_scheme(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Whether `agent`'s photo warrants an upload for `existing`.
///
/// `None` when the entry's photo is editor-owned, the directory has no photo,
/// or the normalised URL equals the stored `photoSourceUrl`.
pub fn photo_change(agent: &AgentRecord, existing: Option<&RosterEntry>) -> Option<PhotoChange> {
    if existing.is_some_and(|e| e.overrides.protects(Field::PhotoRef)) {
        return None;
    }
    let url = normalize_photo_url(&agent.photo_url)?;
    let stored = existing
        .map(|e| e.fields.get(Field::PhotoSourceUrl))
        .unwrap_or("");
    if stored == url {
        return None;
    }
    Some(PhotoChange { url })
}

/// Upload the changed photo and return the fields to add to the write.
///
/// Returns an empty map when the upload fails.
pub async fn upload(
    uploader: &dyn PhotoUploader,
    change: &PhotoChange,
    agent: &str,
) -> BTreeMap<Field, String> {
    let mut fields = BTreeMap::new();
    match uploader.upload(&change.url).await {
        Ok(asset) => {
            tracing::debug!(agent = %agent, asset = %asset, "photo uploaded");
            fields.insert(Field::PhotoRef, asset.0);
            fields.insert(Field::PhotoSourceUrl, change.url.clone());
        }
        Err(err) => {
            tracing::warn!(agent = %agent, url = %change.url, error = %err, "photo upload failed; keeping previous photo");
        }
    }
    fields
}
