use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Core(#[from] ripple_core::CoreError),

    #[error("failed to publish {name}@{version}: {reason}")]
    PublishFailed {
        name: String,
        version: String,
        reason: String,
    },

    #[error("failed to list versions of '{name}': {stderr}")]
    ListFailed { name: String, stderr: String },

    #[error("unexpected version listing for '{name}'")]
    ParseVersions {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build lookup thread pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
