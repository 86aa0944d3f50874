use ripple_git::{GitClient, ensure_shared_history};
use ripple_workspace::Workspace;
use tracing::info;

use crate::apply::{AppliedBump, apply_bump};
use crate::changelog::ChangelogWriter;
use crate::loader::load_records;
use crate::planner::compute_decision;
use crate::types::{BumpDecision, RunConfig};
use crate::Result;

#[derive(Debug)]
pub struct BumpOutcome {
    pub decision: BumpDecision,
    /// `None` on a dry run.
    pub applied: Option<AppliedBump>,
}

/// Consumes pending change records and writes the resulting versions, ranges
/// and changelogs. `--dry-run` computes the decision without touching disk.
///
/// # Errors
///
/// Fails on assurance-protocol fatals (when a `since` boundary needs one),
/// record loading errors, and write failures.
pub fn bump(
    workspace: &Workspace,
    git: &dyn GitClient,
    changelog: &dyn ChangelogWriter,
    config: &RunConfig,
) -> Result<BumpOutcome> {
    // the since boundary diffs against the comparison branch, which requires
    // a valid merge base
    if config.since.is_some() {
        ensure_shared_history(git, &config.branch, config.fetch, config.depth)?;
    }

    let loaded = load_records(workspace, &config.records_dir, git, config.since.as_deref())?;
    let decision = compute_decision(
        workspace,
        &loaded,
        config.bump_dependents,
        &config.prerelease_id,
    );
    info!(
        bumped = decision.versions.len(),
        records = decision.records.len(),
        "computed bump decision"
    );

    if config.dry_run {
        return Ok(BumpOutcome {
            decision,
            applied: None,
        });
    }

    let applied = apply_bump(workspace, &decision, config, changelog)?;
    Ok(BumpOutcome {
        decision,
        applied: Some(applied),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::JsonChangelogWriter;
    use ripple_core::{ChangeKind, ChangeRecord};
    use ripple_git::testing::ScriptedGit;
    use ripple_workspace::ScopeConfig;
    use std::path::PathBuf;

    fn setup(dir: &tempfile::TempDir) -> (Workspace, RunConfig) {
        let root = dir.path();
        let pkg_dir = root.join("packages/pkg-a");
        std::fs::create_dir_all(&pkg_dir).expect("create dir");
        std::fs::write(
            pkg_dir.join("package.json"),
            r#"{ "name": "pkg-a", "version": "1.0.0" }"#,
        )
        .expect("write manifest");
        let ws = Workspace::resolve(
            root,
            &[PathBuf::from("packages/pkg-a/package.json")],
            &ScopeConfig::default(),
            &[],
        )
        .expect("resolve");
        let config = RunConfig {
            records_dir: root.join(".ripple"),
            ..RunConfig::default()
        };
        (ws, config)
    }

    fn seed_record(config: &RunConfig) {
        let record = ChangeRecord {
            package: "pkg-a".to_string(),
            kind: ChangeKind::Minor,
            comment: "feature".to_string(),
            author: "dev@example.com".to_string(),
            dependent_kind: None,
            commit: None,
        };
        crate::records::write_record(&config.records_dir, &record, "main", &chrono::Utc::now())
            .expect("write record");
    }

    #[test]
    fn dry_run_computes_without_writing() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let (ws, config) = setup(&dir);
        seed_record(&config);
        let config = RunConfig {
            dry_run: true,
            ..config
        };
        let git = ScriptedGit::new();

        let outcome = bump(&ws, &git, &JsonChangelogWriter, &config)?;

        assert!(outcome.applied.is_none());
        assert_eq!(
            outcome.decision.versions["pkg-a"],
            "1.1.0".parse::<semver::Version>()?
        );
        let manifest = std::fs::read_to_string(dir.path().join("packages/pkg-a/package.json"))?;
        assert!(manifest.contains("\"1.0.0\""), "untouched on dry run");
        assert!(outcome.decision.record_files[0].exists());
        Ok(())
    }

    #[test]
    fn real_run_writes_and_consumes_records() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let (ws, config) = setup(&dir);
        seed_record(&config);
        let git = ScriptedGit::new();

        let outcome = bump(&ws, &git, &JsonChangelogWriter, &config)?;

        let applied = outcome.applied.expect("applied");
        assert_eq!(applied.manifests_written.len(), 1);
        assert_eq!(applied.records_deleted.len(), 1);
        let manifest = std::fs::read_to_string(dir.path().join("packages/pkg-a/package.json"))?;
        assert!(manifest.contains("\"1.1.0\""));
        Ok(())
    }

    #[test]
    fn no_records_is_a_clean_no_op() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let (ws, config) = setup(&dir);
        let git = ScriptedGit::new();

        let outcome = bump(&ws, &git, &JsonChangelogWriter, &config)?;

        assert!(outcome.decision.versions.is_empty());
        Ok(())
    }
}
