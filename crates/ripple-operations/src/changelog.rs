use std::path::Path;

use ripple_core::ChangeKind;
use serde::{Deserialize, Serialize};

use crate::error::OperationError;
use crate::Result;

/// One comment inside a changelog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogComment {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub comment: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Upstream packages whose bumps caused this one; empty for direct
    /// changes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caused_by: Vec<String>,
}

/// One released version of one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    pub version: String,
    pub date: String,
    pub comments: Vec<ChangelogComment>,
}

/// Changelog persistence seam. Rendering and templating live outside the
/// release core; this trait is the whole contract the bump writer needs.
pub trait ChangelogWriter: Send + Sync {
    /// Prepends `entry` to the package's changelog.
    ///
    /// # Errors
    ///
    /// Returns an error if the changelog cannot be read or written.
    fn append(&self, package_dir: &Path, package: &str, entry: &ChangelogEntry) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ChangelogFile {
    name: String,
    entries: Vec<ChangelogEntry>,
}

/// Writes `CHANGELOG.json` next to each package manifest, newest entry first.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChangelogWriter;

impl ChangelogWriter for JsonChangelogWriter {
    fn append(&self, package_dir: &Path, package: &str, entry: &ChangelogEntry) -> Result<()> {
        let path = package_dir.join("CHANGELOG.json");

        let mut file = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|source| OperationError::RecordParse {
                path: path.clone(),
                source,
            })?
        } else {
            ChangelogFile {
                name: package.to_string(),
                entries: Vec::new(),
            }
        };

        // re-applying the same decision replaces the head entry instead of
        // duplicating it
        if file
            .entries
            .first()
            .is_some_and(|head| head.version == entry.version)
        {
            file.entries[0] = entry.clone();
        } else {
            file.entries.insert(0, entry.clone());
        }

        let mut rendered =
            serde_json::to_string_pretty(&file).map_err(|source| OperationError::RecordParse {
                path: path.clone(),
                source,
            })?;
        rendered.push('\n');
        std::fs::write(&path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str) -> ChangelogEntry {
        ChangelogEntry {
            version: version.to_string(),
            date: "2026-08-07".to_string(),
            comments: vec![ChangelogComment {
                kind: ChangeKind::Patch,
                comment: "fix".to_string(),
                author: "dev@example.com".to_string(),
                commit: Some("abc123".to_string()),
                caused_by: Vec::new(),
            }],
        }
    }

    #[test]
    fn new_entries_land_first() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let writer = JsonChangelogWriter;

        writer.append(dir.path(), "pkg-a", &entry("1.0.1"))?;
        writer.append(dir.path(), "pkg-a", &entry("1.1.0"))?;

        let content = std::fs::read_to_string(dir.path().join("CHANGELOG.json"))?;
        let file: ChangelogFile = serde_json::from_str(&content)?;
        assert_eq!(file.name, "pkg-a");
        assert_eq!(file.entries.len(), 2);
        assert_eq!(file.entries[0].version, "1.1.0");
        Ok(())
    }

    #[test]
    fn reappending_the_same_version_replaces_the_head_entry() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let writer = JsonChangelogWriter;

        writer.append(dir.path(), "pkg-a", &entry("1.0.1"))?;
        writer.append(dir.path(), "pkg-a", &entry("1.0.1"))?;

        let content = std::fs::read_to_string(dir.path().join("CHANGELOG.json"))?;
        let file: ChangelogFile = serde_json::from_str(&content)?;
        assert_eq!(file.entries.len(), 1);
        Ok(())
    }
}
