use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Operation(#[from] ripple_operations::OperationError),

    #[error(transparent)]
    Git(#[from] ripple_git::GitError),

    #[error(transparent)]
    Workspace(#[from] ripple_workspace::WorkspaceError),

    #[error(transparent)]
    Registry(#[from] ripple_registry::RegistryError),

    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to determine current directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("{changed} package(s) changed without a change record: {missing}")]
    MissingChangeRecords { changed: usize, missing: String },
}
