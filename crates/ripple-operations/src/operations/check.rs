use std::collections::BTreeSet;
use std::path::Path;

use ripple_git::{GitClient, ensure_shared_history};
use ripple_workspace::Workspace;
use tracing::debug;

use crate::loader::load_records;
use crate::types::RunConfig;
use crate::Result;

/// Result of verifying pending records against the actual diff.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// In-scope packages with changes since the comparison branch.
    pub changed: Vec<String>,
    /// Changed packages with no pending change record.
    pub missing: Vec<String>,
}

impl CheckReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Verifies that every package changed since the comparison branch has a
/// pending change record. Runs the shared-history assurance first so the diff
/// is meaningful at all.
///
/// # Errors
///
/// Fails on assurance-protocol fatals and VCS failures.
pub fn check(workspace: &Workspace, git: &dyn GitClient, config: &RunConfig) -> Result<CheckReport> {
    ensure_shared_history(git, &config.branch, config.fetch, config.depth)?;

    let changes = git.name_status_diff(&config.branch)?;
    let records_dir = &config.records_dir;

    let mut changed: BTreeSet<String> = BTreeSet::new();
    for change in &changes {
        if change.path.starts_with(records_dir) {
            continue;
        }
        if let Some(owner) = owning_package(workspace, &change.path) {
            changed.insert(owner);
        }
    }

    let loaded = load_records(workspace, records_dir, git, config.since.as_deref())?;
    let covered: BTreeSet<&str> = loaded
        .records
        .iter()
        .map(|record| record.package.as_str())
        .collect();

    let missing: Vec<String> = changed
        .iter()
        .filter(|name| !covered.contains(name.as_str()))
        .cloned()
        .collect();
    debug!(changed = changed.len(), missing = missing.len(), "check complete");

    Ok(CheckReport {
        changed: changed.into_iter().collect(),
        missing,
    })
}

/// Maps a repo-relative file path onto the deepest in-scope, non-private
/// package whose directory contains it.
fn owning_package(workspace: &Workspace, file: &Path) -> Option<String> {
    let mut owner: Option<(usize, &str)> = None;
    for manifest in workspace.packages.values() {
        if manifest.private || !workspace.in_scope(&manifest.name) {
            continue;
        }
        let rel_dir = manifest
            .dir()
            .strip_prefix(&workspace.root)
            .unwrap_or(manifest.dir());
        if file.starts_with(rel_dir) {
            let depth = rel_dir.components().count();
            if owner.is_none_or(|(best, _)| depth > best) {
                owner = Some((depth, &manifest.name));
            }
        }
    }
    owner.map(|(_, name)| name.to_string())
}
