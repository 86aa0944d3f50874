use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use indexmap::IndexMap;
use ripple_core::{ChangeKind, ChangeRecord};
use ripple_workspace::{GroupConfig, ScopeConfig};
use semver::Version;
use serde::Deserialize;

/// Registry connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    /// Default dist-tag; per-package options can override it.
    pub dist_tag: String,
    pub access: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            dist_tag: "latest".to_string(),
            access: None,
        }
    }
}

/// Configuration for one run, merged from the config file and CLI flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    /// Comparison branch, possibly remote-qualified.
    pub branch: String,
    /// Directory holding pending change records, relative to the repo root.
    pub records_dir: PathBuf,
    pub fetch: bool,
    pub depth: Option<u32>,
    pub bump_dependents: bool,
    pub publish: bool,
    pub push: bool,
    pub dry_run: bool,
    /// Keep change records on disk after a successful bump.
    pub keep_records: bool,
    /// Publish packages never seen in the registry, even with kind `none`.
    pub new_packages: bool,
    pub prerelease_id: String,
    pub push_retries: u32,
    /// Only consider change records introduced after this ref.
    pub since: Option<String>,
    pub scope: ScopeConfig,
    pub groups: Vec<GroupConfig>,
    pub registry: RegistryConfig,
    /// Commit message for the bump commit.
    pub message: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            branch: "origin/main".to_string(),
            records_dir: PathBuf::from(".ripple"),
            fetch: true,
            depth: None,
            bump_dependents: true,
            publish: true,
            push: true,
            dry_run: false,
            keep_records: false,
            new_packages: true,
            prerelease_id: "beta".to_string(),
            push_retries: 3,
            since: None,
            scope: ScopeConfig::default(),
            groups: Vec::new(),
            registry: RegistryConfig::default(),
            message: "applying package updates".to_string(),
        }
    }
}

/// The engine's computed output for one run. Ephemeral: recomputed from the
/// on-disk snapshot every time, never persisted.
#[derive(Debug, Clone, Default)]
pub struct BumpDecision {
    /// Final change kind per package, including `None` entries.
    pub kinds: IndexMap<String, ChangeKind>,
    /// Computed next version for every package actually bumped.
    pub versions: IndexMap<String, Version>,
    /// Packages whose manifest will be rewritten.
    pub modified: BTreeSet<String>,
    /// Packages on disk that the registry has never seen; always eligible for
    /// publish regardless of change kind.
    pub new_packages: BTreeSet<String>,
    /// dependent package -> upstream packages that caused its bump. Used only
    /// for changelog attribution.
    pub dependent_changed_by: BTreeMap<String, BTreeSet<String>>,
    /// The records the decision was computed from.
    pub records: Vec<ChangeRecord>,
    /// Files backing `records`, deleted at successful bump time.
    pub record_files: Vec<PathBuf>,
}

impl BumpDecision {
    #[must_use]
    pub fn kind_of(&self, name: &str) -> ChangeKind {
        self.kinds.get(name).copied().unwrap_or(ChangeKind::None)
    }

    /// Records targeting `name`.
    #[must_use]
    pub fn records_for(&self, name: &str) -> Vec<&ChangeRecord> {
        self.records.iter().filter(|r| r.package == name).collect()
    }
}
