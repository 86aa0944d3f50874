use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to spawn '{program}'")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
