use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use ripple_manifest::{PackageManifest, read_manifest};

use crate::error::WorkspaceError;
use crate::groups::{GroupConfig, VersionGroup};
use crate::scope::{ScopeConfig, build_glob_set};

/// Every resolved manifest in the workspace, plus the reverse dependents
/// graph, the in-scope set, and resolved version groups.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    /// All packages by name, in resolution order, including out-of-scope ones.
    pub packages: IndexMap<String, PackageManifest>,
    /// dependency name -> names of workspace packages depending on it.
    dependents: BTreeMap<String, BTreeSet<String>>,
    /// Names of in-scope packages.
    scope: BTreeSet<String>,
    pub groups: IndexMap<String, VersionGroup>,
}

impl Workspace {
    /// Resolves a workspace from the tracked manifest paths.
    ///
    /// `manifest_paths` may be absolute or relative to `root`; scope and group
    /// patterns are evaluated against each package's directory path relative
    /// to `root`.
    ///
    /// # Errors
    ///
    /// Fails fast on unreadable manifests, duplicate package names, invalid
    /// glob patterns, or a package matching more than one group.
    pub fn resolve(
        root: &Path,
        manifest_paths: &[PathBuf],
        scope_config: &ScopeConfig,
        group_configs: &[GroupConfig],
    ) -> Result<Self, WorkspaceError> {
        let compiled_scope = scope_config.compile()?;
        let compiled_groups = compile_groups(group_configs)?;

        let mut packages: IndexMap<String, PackageManifest> = IndexMap::new();
        let mut scope = BTreeSet::new();
        let mut groups: IndexMap<String, VersionGroup> = group_configs
            .iter()
            .map(|g| {
                (
                    g.name.clone(),
                    VersionGroup {
                        name: g.name.clone(),
                        disallowed: g.disallowed_change_types.clone(),
                        members: Vec::new(),
                    },
                )
            })
            .collect();

        for manifest_path in manifest_paths {
            let absolute = if manifest_path.is_absolute() {
                manifest_path.clone()
            } else {
                root.join(manifest_path)
            };
            let mut manifest = read_manifest(&absolute)?;

            let rel_dir = absolute
                .parent()
                .and_then(|dir| dir.strip_prefix(root).ok())
                .map_or_else(PathBuf::new, Path::to_path_buf);

            let matching: Vec<&str> = compiled_groups
                .iter()
                .filter(|g| g.matches(&rel_dir))
                .map(|g| g.name.as_str())
                .collect();
            match matching.as_slice() {
                [] => {}
                [name] => {
                    manifest.group = Some((*name).to_string());
                    if let Some(group) = groups.get_mut(*name) {
                        group.members.push(manifest.name.clone());
                    }
                }
                many => {
                    return Err(WorkspaceError::AmbiguousGroup {
                        package: manifest.name.clone(),
                        groups: many.iter().map(ToString::to_string).collect(),
                    });
                }
            }

            if compiled_scope.is_in_scope(&rel_dir) {
                scope.insert(manifest.name.clone());
            }

            if let Some(existing) = packages.get(&manifest.name) {
                return Err(WorkspaceError::DuplicatePackage {
                    name: manifest.name.clone(),
                    first: existing.path.clone(),
                    second: manifest.path.clone(),
                });
            }
            packages.insert(manifest.name.clone(), manifest);
        }

        let mut dependents: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for manifest in packages.values() {
            for (_, dependency, _) in manifest.dependencies.entries() {
                if packages.contains_key(dependency) {
                    dependents
                        .entry(dependency.to_string())
                        .or_default()
                        .insert(manifest.name.clone());
                }
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            packages,
            dependents,
            scope,
            groups,
        })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageManifest> {
        self.packages.get(name)
    }

    #[must_use]
    pub fn in_scope(&self, name: &str) -> bool {
        self.scope.contains(name)
    }

    /// Direct dependents of `name`, across all dependency kinds.
    #[must_use]
    pub fn direct_dependents(&self, name: &str) -> impl Iterator<Item = &str> {
        self.dependents
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// The resolved group `name` belongs to, if any.
    #[must_use]
    pub fn group_of(&self, name: &str) -> Option<&VersionGroup> {
        let group_name = self.packages.get(name)?.group.as_deref()?;
        self.groups.get(group_name)
    }

    /// Disallowed change kinds for `name`: its own options merged with its
    /// group's.
    #[must_use]
    pub fn disallowed_kinds(&self, name: &str) -> Vec<ripple_core::ChangeKind> {
        let mut disallowed = self
            .packages
            .get(name)
            .map(|p| p.options.disallowed.clone())
            .unwrap_or_default();
        if let Some(group) = self.group_of(name) {
            for kind in &group.disallowed {
                if !disallowed.contains(kind) {
                    disallowed.push(*kind);
                }
            }
        }
        disallowed
    }
}

struct CompiledGroup {
    name: String,
    include: globset::GlobSet,
    exclude: globset::GlobSet,
}

impl CompiledGroup {
    fn matches(&self, rel_dir: &Path) -> bool {
        self.include.is_match(rel_dir) && !self.exclude.is_match(rel_dir)
    }
}

fn compile_groups(configs: &[GroupConfig]) -> Result<Vec<CompiledGroup>, WorkspaceError> {
    configs
        .iter()
        .map(|g| {
            Ok(CompiledGroup {
                name: g.name.clone(),
                include: build_glob_set(&g.include)?,
                exclude: build_glob_set(&g.exclude)?,
            })
        })
        .collect()
}
