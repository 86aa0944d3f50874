use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ripple_core::ChangeRecord;

use crate::error::OperationError;
use crate::Result;

/// Builds the on-disk name for a change record:
/// `<package>-<timestamp>-<branch>.json`, with path separators flattened so
/// scoped package names and `feature/x` branches stay filesystem-safe.
#[must_use]
pub fn record_file_name(package: &str, branch: &str, timestamp: &DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}.json",
        sanitize(package),
        timestamp.format("%Y%m%d-%H%M%S"),
        sanitize(branch),
    )
}

fn sanitize(part: &str) -> String {
    part.replace(['/', '\\', '@'], "-")
        .trim_matches('-')
        .to_string()
}

/// Writes a record into `dir`, disambiguating with a generated suffix when a
/// same-named file already exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn write_record(
    dir: &Path,
    record: &ChangeRecord,
    branch: &str,
    timestamp: &DateTime<Utc>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| OperationError::RecordWrite {
        path: dir.to_path_buf(),
        source,
    })?;

    let base_name = record_file_name(&record.package, branch, timestamp);
    let mut path = dir.join(&base_name);
    while path.exists() {
        let suffix = petname::petname(2, "-").unwrap_or_else(|| "again".to_string());
        let stem = base_name.trim_end_matches(".json");
        path = dir.join(format!("{stem}-{suffix}.json"));
    }

    let mut rendered =
        serde_json::to_string_pretty(record).map_err(|source| OperationError::RecordParse {
            path: path.clone(),
            source,
        })?;
    rendered.push('\n');
    std::fs::write(&path, rendered).map_err(|source| OperationError::RecordWrite {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_record(path: &Path) -> Result<ChangeRecord> {
    let content = std::fs::read_to_string(path).map_err(|source| OperationError::RecordRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| OperationError::RecordParse {
        path: path.to_path_buf(),
        source,
    })
}

/// All `*.json` record files in `dir`, newest first by modification time.
/// A missing directory is simply an empty record set.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be listed.
pub fn list_record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(dir).map_err(|source| OperationError::RecordList {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| OperationError::RecordList {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            files.push((path, modified));
        }
    }

    files.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(files.into_iter().map(|(path, _)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ripple_core::ChangeKind;

    fn make_record(package: &str) -> ChangeRecord {
        ChangeRecord {
            package: package.to_string(),
            kind: ChangeKind::Patch,
            comment: "fix".to_string(),
            author: "dev@example.com".to_string(),
            dependent_kind: Some(ChangeKind::Patch),
            commit: None,
        }
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 12, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn file_name_flattens_scopes_and_branch_slashes() {
        let name = record_file_name("@acme/pkg-a", "feature/login", &timestamp());
        assert_eq!(name, "acme-pkg-a-20260807-123000-feature-login.json");
    }

    #[test]
    fn write_then_read_round_trips() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let record = make_record("pkg-a");

        let path = write_record(dir.path(), &record, "main", &timestamp())?;
        let back = read_record(&path)?;

        assert_eq!(back, record);
        Ok(())
    }

    #[test]
    fn collisions_get_a_disambiguator() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let record = make_record("pkg-a");

        let first = write_record(dir.path(), &record, "main", &timestamp())?;
        let second = write_record(dir.path(), &record, "main", &timestamp())?;

        assert_ne!(first, second);
        assert!(second.exists());
        Ok(())
    }

    #[test]
    fn listing_a_missing_directory_is_empty() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let files = list_record_files(&dir.path().join("nope"))?;
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn listing_ignores_non_json_files() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        std::fs::write(dir.path().join("README.md"), "not a record")?;
        write_record(dir.path(), &make_record("pkg-a"), "main", &timestamp())?;

        let files = list_record_files(dir.path())?;

        assert_eq!(files.len(), 1);
        Ok(())
    }
}
