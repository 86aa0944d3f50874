use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid version in manifest '{path}'")]
    Version {
        path: PathBuf,
        #[source]
        source: semver::Error,
    },

    #[error("manifest '{path}' is missing required field '{field}'")]
    MissingField { path: PathBuf, field: String },

    #[error("failed to write manifest '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest '{path}' has version {actual}, expected {expected} after write")]
    VerificationFailed {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}
