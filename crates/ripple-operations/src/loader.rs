use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ripple_core::ChangeRecord;
use ripple_git::{FileStatus, GitClient};
use ripple_workspace::Workspace;
use tracing::{debug, warn};

use crate::records::{list_record_files, read_record};
use crate::Result;

/// The surviving change records, newest first, with their backing files.
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<ChangeRecord>,
    pub files: Vec<PathBuf>,
}

/// Loads every pending change record and drops the ones that cannot apply:
/// unknown targets and private targets with a warning, out-of-scope targets
/// quietly. With `since`, only records whose files were *added* after that
/// ref survive; a file deleted since the ref is gone from disk and therefore
/// already excluded.
///
/// Each surviving record carries the hash of the commit that introduced its
/// file, falling back to `HEAD` for a record not yet committed.
///
/// # Errors
///
/// Fails on unreadable or unparseable record files and on VCS failures.
pub fn load_records(
    workspace: &Workspace,
    records_dir: &Path,
    git: &dyn GitClient,
    since: Option<&str>,
) -> Result<LoadedRecords> {
    let absolute_dir = if records_dir.is_absolute() {
        records_dir.to_path_buf()
    } else {
        git.root().join(records_dir)
    };

    let mut files = list_record_files(&absolute_dir)?;

    if let Some(since) = since {
        let added = added_since(git, since)?;
        files.retain(|file| {
            let rel = file.strip_prefix(git.root()).unwrap_or(file);
            let keep = added.contains(rel);
            if !keep {
                debug!(file = %rel.display(), "record predates the since ref, skipping");
            }
            keep
        });
    }

    let mut loaded = LoadedRecords::default();
    for file in files {
        let mut record = read_record(&file)?;

        let Some(target) = workspace.get(&record.package) else {
            warn!(
                package = %record.package,
                file = %file.display(),
                "change detected for nonexistent package, dropping record"
            );
            continue;
        };
        if target.private {
            warn!(
                package = %record.package,
                file = %file.display(),
                "change detected for private package, dropping record"
            );
            continue;
        }
        if !workspace.in_scope(&record.package) {
            debug!(
                package = %record.package,
                "change record target is out of scope, skipping"
            );
            continue;
        }

        if record.commit.is_none() {
            record.commit = match git.commit_introducing(&file)? {
                Some(hash) => Some(hash),
                None => Some(git.head_commit()?),
            };
        }

        loaded.records.push(record);
        loaded.files.push(file);
    }

    Ok(loaded)
}

fn added_since(git: &dyn GitClient, since: &str) -> Result<HashSet<PathBuf>> {
    Ok(git
        .name_status_diff(since)?
        .into_iter()
        .filter(|change| change.status == FileStatus::Added)
        .map(|change| change.path)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ripple_core::ChangeKind;
    use ripple_git::FileChange;
    use ripple_git::testing::ScriptedGit;
    use ripple_workspace::ScopeConfig;

    fn setup_workspace(dir: &tempfile::TempDir) -> Workspace {
        let root = dir.path();
        let mut paths = Vec::new();
        for (rel, body) in [
            (
                "packages/pkg-a",
                r#"{ "name": "pkg-a", "version": "1.0.0" }"#,
            ),
            (
                "packages/secret",
                r#"{ "name": "secret", "version": "1.0.0", "private": true }"#,
            ),
            (
                "tools/tool-x",
                r#"{ "name": "tool-x", "version": "1.0.0" }"#,
            ),
        ] {
            let pkg_dir = root.join(rel);
            std::fs::create_dir_all(&pkg_dir).expect("create dir");
            std::fs::write(pkg_dir.join("package.json"), body).expect("write manifest");
            paths.push(PathBuf::from(rel).join("package.json"));
        }
        let scope = ScopeConfig {
            include: vec!["packages/*".to_string()],
            exclude: Vec::new(),
        };
        Workspace::resolve(root, &paths, &scope, &[]).expect("resolve")
    }

    fn write_record_file(dir: &Path, package: &str) -> PathBuf {
        let record = ChangeRecord {
            package: package.to_string(),
            kind: ChangeKind::Patch,
            comment: "fix".to_string(),
            author: "dev@example.com".to_string(),
            dependent_kind: Some(ChangeKind::Patch),
            commit: None,
        };
        let stamp = chrono::Utc
            .with_ymd_and_hms(2026, 8, 7, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        crate::records::write_record(dir, &record, "main", &stamp).expect("write record")
    }

    #[test]
    fn unknown_and_private_targets_are_dropped() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let ws = setup_workspace(&dir);
        let records_dir = dir.path().join(".ripple");
        write_record_file(&records_dir, "pkg-a");
        write_record_file(&records_dir, "ghost");
        write_record_file(&records_dir, "secret");

        let git = ScriptedGit::new();
        let loaded = load_records(&ws, &records_dir, &git, None)?;

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].package, "pkg-a");
        Ok(())
    }

    #[test]
    fn out_of_scope_targets_are_dropped_quietly() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let ws = setup_workspace(&dir);
        let records_dir = dir.path().join(".ripple");
        write_record_file(&records_dir, "tool-x");

        let git = ScriptedGit::new();
        let loaded = load_records(&ws, &records_dir, &git, None)?;

        assert!(loaded.records.is_empty());
        Ok(())
    }

    #[test]
    fn uncommitted_records_fall_back_to_head_commit() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let ws = setup_workspace(&dir);
        let records_dir = dir.path().join(".ripple");
        write_record_file(&records_dir, "pkg-a");

        let git = ScriptedGit::new();
        let loaded = load_records(&ws, &records_dir, &git, None)?;

        assert_eq!(
            loaded.records[0].commit.as_deref(),
            Some("0123456789abcdef0123456789abcdef01234567")
        );
        Ok(())
    }

    #[test]
    fn since_keeps_only_files_added_after_the_ref() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let ws = setup_workspace(&dir);
        let records_dir = dir.path().join(".ripple");
        let kept = write_record_file(&records_dir, "pkg-a");
        write_record_file(&records_dir, "pkg-a"); // disambiguated, not in diff

        // ScriptedGit roots at /scripted/repo, so feed absolute paths through
        // the diff relative to the real files
        let git = ScriptedGit::new().with_diffs(vec![FileChange {
            status: FileStatus::Added,
            path: kept.clone(),
        }]);

        let loaded = load_records(&ws, &records_dir, &git, Some("origin/main"))?;

        assert_eq!(loaded.files, vec![kept]);
        Ok(())
    }
}
