//! Sync configuration and its YAML persistence.
//!
//! # Storage layout
//!
//! ```text
//! ~/.roster/
//!   config.yaml     (mode 0600, written by `roster init`)
//!   roster.json     (default JSON roster store)
//!   assets/         (default photo asset directory)
//!   runs/last.json  (last run report)
//! ```
//!
//! # API pattern
//!
//! Every function touching disk has two forms:
//! - `fn_at(home: &Path, …)`: explicit home, used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_DISPLAY_ORDER: i64 = 100;
pub const DEFAULT_INTERACTIVE_BUDGET_SECS: u64 = 50;
pub const DEFAULT_BACKGROUND_BUDGET_SECS: u64 = 270;

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Which invocation context started a run; selects the wall-clock budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Manual, latency-sensitive invocation.
    #[default]
    Interactive,
    /// Scheduled or offline invocation.
    Background,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerKind::Interactive => write!(f, "interactive"),
            TriggerKind::Background => write!(f, "background"),
        }
    }
}

/// Wall-clock budgets, in seconds, per trigger kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budgets {
    #[serde(default = "default_interactive_secs")]
    pub interactive_secs: u64,
    #[serde(default = "default_background_secs")]
    pub background_secs: u64,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            interactive_secs: DEFAULT_INTERACTIVE_BUDGET_SECS,
            background_secs: DEFAULT_BACKGROUND_BUDGET_SECS,
        }
    }
}

impl Budgets {
    pub fn for_trigger(&self, trigger: TriggerKind) -> Duration {
        match trigger {
            TriggerKind::Interactive => Duration::from_secs(self.interactive_secs),
            TriggerKind::Background => Duration::from_secs(self.background_secs),
        }
    }
}

/// Where agent records come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DirectorySource {
    /// A JSON array export of directory rows on local disk.
    File { path: PathBuf },
    /// An HTTP endpoint answering `GET <url>?office=<selector>` with a JSON array.
    Http {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },
}

/// Explicit configuration for one sync invocation.
///
/// The engine reads nothing else: no ambient settings store, no state kept
/// between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Office IDs or case-insensitive office-name fragments.
    #[serde(default)]
    pub offices: Vec<String>,
    #[serde(default = "default_display_order")]
    pub default_order: i64,
    #[serde(default)]
    pub budgets: Budgets,
    pub directory: DirectorySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,
}

impl SyncConfig {
    /// A fresh enabled config for `offices`, reading from `directory`.
    pub fn new(offices: Vec<String>, directory: DirectorySource) -> Self {
        Self {
            enabled: true,
            offices,
            default_order: DEFAULT_DISPLAY_ORDER,
            budgets: Budgets::default(),
            directory,
            roster_path: None,
            assets_dir: None,
        }
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Err(ConfigError::Disabled);
        }
        if self.office_selectors().is_empty() {
            return Err(ConfigError::NoOffices);
        }
        Ok(())
    }

    /// Trimmed, non-blank office selectors in configured order.
    pub fn office_selectors(&self) -> Vec<String> {
        self.offices
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub fn roster_path_at(&self, home: &Path) -> PathBuf {
        self.roster_path
            .clone()
            .unwrap_or_else(|| roster_root(home).join("roster.json"))
    }

    pub fn assets_dir_at(&self, home: &Path) -> PathBuf {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| roster_root(home).join("assets"))
    }
}

fn default_enabled() -> bool {
    true
}

fn default_display_order() -> i64 {
    DEFAULT_DISPLAY_ORDER
}

fn default_interactive_secs() -> u64 {
    DEFAULT_INTERACTIVE_BUDGET_SECS
}

fn default_background_secs() -> u64 {
    DEFAULT_BACKGROUND_BUDGET_SECS
}

// ---------------------------------------------------------------------------
// 2. Paths
// ---------------------------------------------------------------------------

/// `<home>/.roster/`
pub fn roster_root(home: &Path) -> PathBuf {
    home.join(".roster")
}

/// `<home>/.roster/config.yaml`, pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    roster_root(home).join("config.yaml")
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.roster/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<SyncConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<SyncConfig, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &SyncConfig) -> Result<(), ConfigError> {
    let dir = roster_root(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &SyncConfig) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

/// Write a fresh config unless one already exists.
///
/// Idempotent: an existing config is loaded and returned unchanged.
pub fn init_at(home: &Path, config: SyncConfig) -> Result<SyncConfig, ConfigError> {
    if config_path_at(home).exists() {
        return load_at(home);
    }
    save_at(home, &config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The current user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> SyncConfig {
        SyncConfig::new(
            vec!["OFF-1".into(), "Downtown".into()],
            DirectorySource::File {
                path: PathBuf::from("/data/agents.json"),
            },
        )
    }

    #[test]
    fn config_path_is_correct() {
        let home = TempDir::new().expect("tempdir");
        assert!(config_path_at(home.path()).ends_with(".roster/config.yaml"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let home = TempDir::new().expect("tempdir");
        let config = sample();
        save_at(home.path(), &config).expect("save");
        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn save_sets_file_permissions_and_cleans_tmp() {
        let home = TempDir::new().expect("tempdir");
        save_at(home.path(), &sample()).expect("save");
        let path = config_path_at(home.path());
        assert!(!path.with_file_name("config.yaml.tmp").exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn load_missing_config_returns_not_found() {
        let home = TempDir::new().expect("tempdir");
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let yaml = "offices: [OFF-1]\ndirectory:\n  kind: http\n  url: https://dir.example/agents\n";
        let config: SyncConfig = serde_yaml::from_str(yaml).expect("parse");
        assert!(config.enabled);
        assert_eq!(config.default_order, DEFAULT_DISPLAY_ORDER);
        assert_eq!(
            config.budgets.for_trigger(TriggerKind::Background),
            Duration::from_secs(DEFAULT_BACKGROUND_BUDGET_SECS)
        );
        assert!(matches!(config.directory, DirectorySource::Http { api_key: None, .. }));
    }

    #[test]
    fn validate_rejects_disabled_and_blank_offices() {
        let mut config = sample();
        assert!(config.validate().is_ok());

        config.offices = vec!["  ".into()];
        assert!(matches!(config.validate(), Err(ConfigError::NoOffices)));

        config.offices = vec!["OFF-1".into()];
        config.enabled = false;
        assert!(matches!(config.validate(), Err(ConfigError::Disabled)));
    }

    #[test]
    fn init_is_idempotent() {
        let home = TempDir::new().expect("tempdir");
        init_at(home.path(), sample()).expect("first init");
        let mut other = sample();
        other.offices = vec!["Elsewhere".into()];
        let kept = init_at(home.path(), other).expect("second init");
        assert_eq!(kept.offices, sample().offices);
    }

    #[test]
    fn default_store_paths_live_under_roster_root() {
        let home = TempDir::new().expect("tempdir");
        let config = sample();
        assert!(config.roster_path_at(home.path()).ends_with(".roster/roster.json"));
        assert!(config.assets_dir_at(home.path()).ends_with(".roster/assets"));
    }
}
