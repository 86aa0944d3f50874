use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Manifest(#[from] ripple_manifest::ManifestError),

    #[error("invalid glob pattern '{pattern}'")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error(
        "package '{package}' matches more than one version group ({}); \
         adjust the group patterns so every package matches at most one",
        groups.join(", ")
    )]
    AmbiguousGroup {
        package: String,
        groups: Vec<String>,
    },

    #[error("duplicate package name '{name}' at '{first}' and '{second}'")]
    DuplicatePackage {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}
