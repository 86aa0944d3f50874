use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::error::WorkspaceError;

/// Include/exclude glob patterns evaluated against package directory paths
/// relative to the workspace root. An empty include list means "everything".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ScopeConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub(crate) fn compile(&self) -> Result<CompiledScope, WorkspaceError> {
        Ok(CompiledScope {
            include: if self.include.is_empty() {
                None
            } else {
                Some(build_glob_set(&self.include)?)
            },
            exclude: build_glob_set(&self.exclude)?,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledScope {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl CompiledScope {
    pub(crate) fn is_in_scope(&self, rel_dir: &Path) -> bool {
        let included = self
            .include
            .as_ref()
            .is_none_or(|set| set.is_match(rel_dir));
        included && !self.exclude.is_match(rel_dir)
    }
}

pub(crate) fn build_glob_set(patterns: &[String]) -> Result<GlobSet, WorkspaceError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| WorkspaceError::GlobPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| WorkspaceError::GlobPattern {
        pattern: patterns.join(", "),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scope_includes_everything() {
        let scope = ScopeConfig::default().compile().expect("compile");
        assert!(scope.is_in_scope(Path::new("packages/anything")));
    }

    #[test]
    fn include_restricts_and_exclude_wins() {
        let config = ScopeConfig {
            include: vec!["packages/*".to_string()],
            exclude: vec!["packages/internal-*".to_string()],
        };
        let scope = config.compile().expect("compile");

        assert!(scope.is_in_scope(Path::new("packages/pkg-a")));
        assert!(!scope.is_in_scope(Path::new("tools/pkg-b")));
        assert!(!scope.is_in_scope(Path::new("packages/internal-tool")));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let config = ScopeConfig {
            include: vec!["packages/[".to_string()],
            exclude: Vec::new(),
        };
        assert!(matches!(
            config.compile(),
            Err(WorkspaceError::GlobPattern { .. })
        ));
    }
}
