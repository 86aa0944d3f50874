use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Core(#[from] ripple_core::CoreError),

    #[error(transparent)]
    Manifest(#[from] ripple_manifest::ManifestError),

    #[error(transparent)]
    Workspace(#[from] ripple_workspace::WorkspaceError),

    #[error(transparent)]
    Git(#[from] ripple_git::GitError),

    #[error(transparent)]
    Registry(#[from] ripple_registry::RegistryError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("failed to read change record '{path}'")]
    RecordRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse change record '{path}'")]
    RecordParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to list change records in '{path}'")]
    RecordList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write change record '{path}'")]
    RecordWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown package '{name}' (available: {available})")]
    UnknownPackage { name: String, available: String },

    #[error("package '{name}' is private and can never receive a version bump")]
    PrivatePackage { name: String },

    #[error("missing change kind for package '{name}'; pass --type or run interactively")]
    MissingKind { name: String },

    #[error("change kind '{kind}' is not allowed for package '{name}'")]
    DisallowedKind {
        name: String,
        kind: ripple_core::ChangeKind,
    },

    #[error("missing change comment; pass --message or run interactively")]
    MissingComment,

    #[error("git {operation} failed: {stderr}")]
    GitCommand { operation: String, stderr: String },

    #[error(
        "{name}@{version} already exists in the registry; \
         a concurrent release may have published it; re-run to recompute versions"
    )]
    VersionExists { name: String, version: String },

    #[error(
        "publishing {failed} failed: {reason}\n{}\n\
         published versions cannot be revoked; finish the release manually by \
         publishing the remaining packages and pushing the bump commit, or start \
         a new release after recording the already-published versions",
        render_published(published)
    )]
    PublishAborted {
        failed: String,
        reason: String,
        published: Vec<String>,
    },

    #[error(
        "push rejected {attempts} times; a concurrent release kept winning the race\n{}\n\
         the publish branch '{publish_branch}' still holds the bump commit; \
         merge it into the target branch manually, then delete it",
        render_published(published)
    )]
    PushRetriesExhausted {
        attempts: u32,
        publish_branch: String,
        published: Vec<String>,
    },
}

fn render_published(published: &[String]) -> String {
    if published.is_empty() {
        "no packages were published before the failure".to_string()
    } else {
        format!("already published (irrevocable): {}", published.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, OperationError>;
