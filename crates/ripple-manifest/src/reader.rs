use std::path::Path;

use indexmap::IndexMap;
use ripple_core::ChangeKind;
use serde::Deserialize;

use crate::error::ManifestError;
use crate::model::{DependencyKind, DependencyTable, PackageManifest, PackageOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    private: bool,
    dependencies: Option<IndexMap<String, String>>,
    dev_dependencies: Option<IndexMap<String, String>>,
    peer_dependencies: Option<IndexMap<String, String>>,
    optional_dependencies: Option<IndexMap<String, String>>,
    ripple: Option<RawOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptions {
    #[serde(default)]
    disallowed_change_types: Vec<ChangeKind>,
    tag: Option<String>,
    git_tags: Option<bool>,
}

/// Reads and validates one package manifest.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if `name` or
/// `version` is missing or invalid.
pub fn read_manifest(path: &Path) -> Result<PackageManifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawManifest =
        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let name = raw.name.ok_or_else(|| ManifestError::MissingField {
        path: path.to_path_buf(),
        field: "name".to_string(),
    })?;
    let version = raw.version.ok_or_else(|| ManifestError::MissingField {
        path: path.to_path_buf(),
        field: "version".to_string(),
    })?;
    let version = version.parse().map_err(|source| ManifestError::Version {
        path: path.to_path_buf(),
        source,
    })?;

    let mut dependencies = DependencyTable::default();
    let raw_maps = [
        (DependencyKind::Runtime, raw.dependencies),
        (DependencyKind::Dev, raw.dev_dependencies),
        (DependencyKind::Peer, raw.peer_dependencies),
        (DependencyKind::Optional, raw.optional_dependencies),
    ];
    for (kind, map) in raw_maps {
        for (dep, range) in map.unwrap_or_default() {
            dependencies.insert(kind, dep, range);
        }
    }

    let options = raw.ripple.map_or_else(PackageOptions::default, |o| {
        PackageOptions {
            disallowed: o.disallowed_change_types,
            tag: o.tag,
            git_tags: o.git_tags.unwrap_or(true),
        }
    });

    Ok(PackageManifest {
        name,
        version,
        private: raw.private,
        dependencies,
        path: path.to_path_buf(),
        group: None,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    fn write_manifest(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("package.json");
        std::fs::write(&path, content).expect("write manifest");
        path
    }

    #[test]
    fn reads_minimal_manifest() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = write_manifest(&dir, r#"{ "name": "pkg-a", "version": "1.2.3" }"#);

        let manifest = read_manifest(&path)?;

        assert_eq!(manifest.name, "pkg-a");
        assert_eq!(manifest.version, Version::new(1, 2, 3));
        assert!(!manifest.private);
        assert!(manifest.options.git_tags);
        assert!(manifest.group.is_none());
        Ok(())
    }

    #[test]
    fn reads_dependency_maps_and_options() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = write_manifest(
            &dir,
            r#"{
                "name": "pkg-a",
                "version": "1.0.0",
                "private": true,
                "dependencies": { "pkg-b": "^1.0.0" },
                "devDependencies": { "pkg-c": "~2.0.0" },
                "peerDependencies": { "pkg-d": ">=1.0.0 <2.0.0" },
                "optionalDependencies": { "pkg-e": "3.0.0" },
                "ripple": {
                    "disallowedChangeTypes": ["major"],
                    "tag": "next",
                    "gitTags": false
                }
            }"#,
        );

        let manifest = read_manifest(&path)?;

        assert!(manifest.private);
        assert_eq!(
            manifest.dependencies.get(DependencyKind::Runtime)["pkg-b"],
            "^1.0.0"
        );
        assert_eq!(
            manifest.dependencies.get(DependencyKind::Peer)["pkg-d"],
            ">=1.0.0 <2.0.0"
        );
        assert_eq!(manifest.options.disallowed, vec![ChangeKind::Major]);
        assert_eq!(manifest.options.tag.as_deref(), Some("next"));
        assert!(!manifest.options.git_tags);
        Ok(())
    }

    #[test]
    fn missing_version_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = write_manifest(&dir, r#"{ "name": "pkg-a" }"#);

        let result = read_manifest(&path);

        assert!(matches!(
            result,
            Err(ManifestError::MissingField { field, .. }) if field == "version"
        ));
        Ok(())
    }

    #[test]
    fn invalid_version_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = write_manifest(&dir, r#"{ "name": "pkg-a", "version": "not-semver" }"#);

        assert!(matches!(
            read_manifest(&path),
            Err(ManifestError::Version { .. })
        ));
        Ok(())
    }
}
