use ripple_manifest::{verify_version, write_version};
use ripple_registry::{RegistryClient, VersionCache, prefetch_versions};
use ripple_workspace::Workspace;
use semver::Version;
use tracing::info;

use crate::types::RunConfig;
use crate::Result;

/// One manifest version adopted from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncChange {
    pub name: String,
    pub local: Version,
    pub registry: Version,
}

/// Aligns local manifest versions with the registry: any in-scope, non-private
/// package whose highest published version is ahead of the manifest gets the
/// registry version written back. With `force`, a differing registry version
/// wins even when the local one is ahead.
///
/// # Errors
///
/// Fails on registry lookup or manifest write failures.
pub fn sync(
    workspace: &Workspace,
    registry: &dyn RegistryClient,
    config: &RunConfig,
    cache: &mut VersionCache,
    force: bool,
) -> Result<Vec<SyncChange>> {
    let names: Vec<String> = workspace
        .packages
        .values()
        .filter(|p| !p.private && workspace.in_scope(&p.name))
        .map(|p| p.name.clone())
        .collect();
    prefetch_versions(registry, &names, cache)?;

    let mut changes = Vec::new();
    for name in &names {
        let Some(manifest) = workspace.get(name) else {
            continue;
        };
        let Some(latest) = cache.get(name).and_then(|v| v.iter().max()).cloned() else {
            continue;
        };

        let ahead = latest > manifest.version;
        if !(ahead || (force && latest != manifest.version)) {
            continue;
        }

        info!(package = %name, local = %manifest.version, registry = %latest, "syncing version");
        if !config.dry_run {
            write_version(&manifest.path, &latest)?;
            verify_version(&manifest.path, &latest)?;
        }
        changes.push(SyncChange {
            name: name.clone(),
            local: manifest.version.clone(),
            registry: latest,
        });
    }

    Ok(changes)
}
