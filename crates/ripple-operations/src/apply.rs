use std::path::PathBuf;

use ripple_core::ChangeKind;
use ripple_manifest::{RangeUpdate, update_dependency_ranges, verify_version, write_version};
use ripple_workspace::Workspace;
use tracing::debug;

use crate::changelog::{ChangelogComment, ChangelogEntry, ChangelogWriter};
use crate::types::{BumpDecision, RunConfig};
use crate::Result;

/// What a bump application actually wrote.
#[derive(Debug, Default)]
pub struct AppliedBump {
    pub manifests_written: Vec<PathBuf>,
    pub range_updates: Vec<(PathBuf, RangeUpdate)>,
    pub records_deleted: Vec<PathBuf>,
}

/// Writes a [`BumpDecision`] to disk: package versions, dependency ranges,
/// changelog entries, and record deletion. Deliberately re-runnable against
/// the same decision: the publish protocol re-applies it after merging in
/// concurrent upstream writes.
///
/// # Errors
///
/// Returns an error on any manifest, changelog, or filesystem failure.
pub fn apply_bump(
    workspace: &Workspace,
    decision: &BumpDecision,
    config: &RunConfig,
    changelog: &dyn ChangelogWriter,
) -> Result<AppliedBump> {
    let mut applied = AppliedBump::default();

    for (name, version) in &decision.versions {
        let Some(manifest) = workspace.get(name) else {
            continue;
        };
        write_version(&manifest.path, version)?;
        verify_version(&manifest.path, version)?;
        debug!(package = %name, version = %version, "wrote manifest version");
        applied.manifests_written.push(manifest.path.clone());
    }

    // every manifest gets its ranges rewritten, bumped or not
    for manifest in workspace.packages.values() {
        for update in update_dependency_ranges(&manifest.path, &decision.versions)? {
            debug!(
                manifest = %manifest.path.display(),
                dependency = %update.dependency,
                old = %update.old_range,
                new = %update.new_range,
                "rewrote dependency range"
            );
            applied
                .range_updates
                .push((manifest.path.clone(), update));
        }
    }

    let date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    for (name, version) in &decision.versions {
        let Some(manifest) = workspace.get(name) else {
            continue;
        };
        let entry = ChangelogEntry {
            version: version.to_string(),
            date: date.clone(),
            comments: collect_comments(decision, name),
        };
        changelog.append(manifest.dir(), name, &entry)?;
    }

    if !config.keep_records {
        for file in &decision.record_files {
            if file.exists() {
                std::fs::remove_file(file)?;
                applied.records_deleted.push(file.clone());
            }
        }
    }

    Ok(applied)
}

fn collect_comments(decision: &BumpDecision, name: &str) -> Vec<ChangelogComment> {
    let mut comments: Vec<ChangelogComment> = decision
        .records_for(name)
        .into_iter()
        .map(|record| ChangelogComment {
            kind: record.kind,
            comment: record.comment.clone(),
            author: record.author.clone(),
            commit: record.commit.clone(),
            caused_by: Vec::new(),
        })
        .collect();

    if let Some(causes) = decision.dependent_changed_by.get(name) {
        let caused_by: Vec<String> = causes.iter().cloned().collect();
        let bumped: Vec<String> = causes
            .iter()
            .filter_map(|cause| {
                decision
                    .versions
                    .get(cause)
                    .map(|v| format!("{cause} to {v}"))
            })
            .collect();
        comments.push(ChangelogComment {
            kind: decision.kind_of(name).min(ChangeKind::Patch),
            comment: format!("Bump {}", bumped.join(", ")),
            author: "ripple".to_string(),
            commit: None,
            caused_by,
        });
    }

    comments
}
