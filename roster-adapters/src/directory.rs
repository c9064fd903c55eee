//! Agent directory adapters.
//!
//! Directory exports are loosely typed: identifiers arrive as numbers or
//! strings, license numbers as a single value or a list, the office address
//! either structured or as one line. [`DirectoryRow`] absorbs all of that at
//! the boundary so the engine only ever sees a clean [`AgentRecord`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use roster_core::{AgentRecord, OfficeAddress, PersonName, Phones, SourceIds};
use roster_sync::{AgentDirectory, CollaboratorError};

use crate::error::{http_err, io_err, AdapterError};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Loose scalars
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Scalar),
    Many(Vec<Option<Scalar>>),
}

/// Number, string or null, as a trimmed string (`""` for null).
fn loose_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(de)?;
    Ok(value.map(Scalar::into_string).unwrap_or_default())
}

/// A single value or a list, as a list of non-blank strings.
fn loose_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<OneOrMany> = Option::deserialize(de)?;
    let items = match value {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s.into_string()],
        Some(OneOrMany::Many(list)) => list.into_iter().flatten().map(Scalar::into_string).collect(),
    };
    Ok(items.into_iter().filter(|s| !s.is_empty()).collect())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawAddress {
    Structured {
        #[serde(default, deserialize_with = "loose_string")]
        street: String,
        #[serde(default, deserialize_with = "loose_string")]
        city: String,
        #[serde(default, deserialize_with = "loose_string")]
        state: String,
        #[serde(
            default,
            rename = "postalCode",
            alias = "zip",
            deserialize_with = "loose_string"
        )]
        postal_code: String,
    },
    Flat(String),
}

fn loose_address<'de, D>(de: D) -> Result<OfficeAddress, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawAddress> = Option::deserialize(de)?;
    Ok(match raw {
        None => OfficeAddress::default(),
        Some(RawAddress::Flat(line)) => OfficeAddress {
            street: line.trim().to_string(),
            ..Default::default()
        },
        Some(RawAddress::Structured {
            street,
            city,
            state,
            postal_code,
        }) => OfficeAddress {
            street,
            city,
            state,
            postal_code,
        },
    })
}

// ---------------------------------------------------------------------------
// DirectoryRow
// ---------------------------------------------------------------------------

/// One row of a directory export, as delivered.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRow {
    #[serde(default, deserialize_with = "loose_string")]
    pub staff_id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub entity_id: String,
    #[serde(default, rename = "id", deserialize_with = "loose_string")]
    pub row_id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub last_name: String,
    #[serde(default, alias = "primaryEmail", deserialize_with = "loose_string")]
    pub email: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub lead_routing_email: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub business_phone: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub mobile_phone: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub office_phone: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub office_id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub office_name: String,
    #[serde(default, deserialize_with = "loose_address")]
    pub office_address: OfficeAddress,
    #[serde(default, deserialize_with = "loose_string")]
    pub bio_rich_text: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub photo_url: String,
    #[serde(default, alias = "licenseNumber", deserialize_with = "loose_list")]
    pub license_numbers: Vec<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub specialty_tag: String,
}

impl DirectoryRow {
    /// Exact office ID, or case-insensitive fragment of the office name.
    pub fn in_office(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if selector.is_empty() {
            return false;
        }
        if self.office_id == selector {
            return true;
        }
        self.office_name
            .to_lowercase()
            .contains(&selector.to_lowercase())
    }

    pub fn into_record(self) -> AgentRecord {
        let email = if self.email.is_empty() {
            self.lead_routing_email
        } else {
            self.email
        };
        AgentRecord {
            ids: SourceIds {
                staff_id: self.staff_id,
                entity_id: self.entity_id,
                row_id: self.row_id,
            },
            name: PersonName {
                first: self.first_name,
                last: self.last_name,
            },
            email,
            phones: Phones {
                business: self.business_phone,
                mobile: self.mobile_phone,
                office: self.office_phone,
            },
            office_name: self.office_name,
            office_address: self.office_address,
            bio: self.bio_rich_text,
            photo_url: self.photo_url,
            license_ids: self.license_numbers,
            specialty: self.specialty_tag,
        }
    }
}

/// Decode a JSON array of rows, dropping (and logging) rows that do not
/// decode instead of failing the whole office.
pub fn decode_rows(raw: &str, what: &str) -> Result<Vec<DirectoryRow>, AdapterError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| AdapterError::Decode {
            what: what.to_string(),
            message: e.to_string(),
        })?;
    let mut rows = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<DirectoryRow>(value) {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(source = %what, row = idx, error = %e, "skipping undecodable directory row"),
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// FileDirectory
// ---------------------------------------------------------------------------

/// Directory backed by a JSON export on disk, re-read on every fetch.
#[derive(Debug, Clone)]
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self, selector: &str) -> Result<Vec<AgentRecord>, AdapterError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| io_err(&self.path, e))?;
        let rows = decode_rows(&raw, &self.path.display().to_string())?;
        Ok(rows
            .into_iter()
            .filter(|r| r.in_office(selector))
            .map(DirectoryRow::into_record)
            .collect())
    }
}

#[async_trait]
impl AgentDirectory for FileDirectory {
    async fn fetch_office(&self, selector: &str) -> Result<Vec<AgentRecord>, CollaboratorError> {
        Ok(self.load(selector).await?)
    }
}

// ---------------------------------------------------------------------------
// HttpDirectory
// ---------------------------------------------------------------------------

/// Directory behind an HTTP endpoint answering `GET <url>?office=<selector>`
/// with a JSON array of rows for that office.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    url: String,
    api_key: Option<String>,
}

impl HttpDirectory {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
        }
    }

    fn fetch_blocking(&self, selector: &str) -> Result<Vec<AgentRecord>, AdapterError> {
        let agent = ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build();
        let mut request = agent.get(&self.url).query("office", selector);
        if let Some(key) = &self.api_key {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }
        let response = request.call().map_err(|e| http_err(&self.url, e))?;
        let body = response.into_string().map_err(|e| AdapterError::Transport {
            url: self.url.clone(),
            message: e.to_string(),
        })?;
        let rows = decode_rows(&body, &self.url)?;
        Ok(rows.into_iter().map(DirectoryRow::into_record).collect())
    }
}

#[async_trait]
impl AgentDirectory for HttpDirectory {
    async fn fetch_office(&self, selector: &str) -> Result<Vec<AgentRecord>, CollaboratorError> {
        let this = self.clone();
        let selector = selector.to_string();
        let records = tokio::task::spawn_blocking(move || this.fetch_blocking(&selector))
            .await
            .map_err(|e| AdapterError::Task(e.to_string()))??;
        Ok(records)
    }
}
