use std::path::Path;

use indexmap::IndexMap;
use semver::Version;
use serde_json::Value;

use crate::error::ManifestError;
use crate::model::DependencyKind;
use crate::range::bump_range;
use crate::reader::read_manifest;

/// A dependency range rewritten in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeUpdate {
    pub kind: DependencyKind,
    pub dependency: String,
    pub old_range: String,
    pub new_range: String,
}

fn read_document(path: &Path) -> Result<Value, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(path: &Path, doc: &Value) -> Result<(), ManifestError> {
    let mut rendered = serde_json::to_string_pretty(doc).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    rendered.push('\n');
    std::fs::write(path, rendered).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a new package version into a manifest, preserving every other field.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or written.
pub fn write_version(path: &Path, version: &Version) -> Result<(), ManifestError> {
    let mut doc = read_document(path)?;

    let object = doc
        .as_object_mut()
        .ok_or_else(|| ManifestError::MissingField {
            path: path.to_path_buf(),
            field: "(root object)".to_string(),
        })?;
    object.insert("version".to_string(), Value::String(version.to_string()));

    write_document(path, &doc)
}

/// # Errors
///
/// Returns [`ManifestError::VerificationFailed`] if the version on disk does
/// not match `expected`.
pub fn verify_version(path: &Path, expected: &Version) -> Result<(), ManifestError> {
    let actual = read_manifest(path)?.version;
    if actual != *expected {
        return Err(ManifestError::VerificationFailed {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Rewrites every dependency range in `path` that targets a package in
/// `new_versions`, preserving range operators. The file is only rewritten when
/// at least one range actually changes.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, parsed, or written.
pub fn update_dependency_ranges(
    path: &Path,
    new_versions: &IndexMap<String, Version>,
) -> Result<Vec<RangeUpdate>, ManifestError> {
    let mut doc = read_document(path)?;
    let mut updates = Vec::new();

    for kind in DependencyKind::ALL {
        let Some(map) = doc
            .get_mut(kind.manifest_key())
            .and_then(Value::as_object_mut)
        else {
            continue;
        };

        for (dependency, version) in new_versions {
            let Some(entry) = map.get_mut(dependency) else {
                continue;
            };
            let Some(old_range) = entry.as_str().map(ToOwned::to_owned) else {
                continue;
            };
            let Some(new_range) = bump_range(&old_range, version) else {
                continue;
            };
            if new_range == old_range {
                continue;
            }

            *entry = Value::String(new_range.clone());
            updates.push(RangeUpdate {
                kind,
                dependency: dependency.clone(),
                old_range,
                new_range,
            });
        }
    }

    if !updates.is_empty() {
        write_document(path, &doc)?;
    }

    Ok(updates)
}
