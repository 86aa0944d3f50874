mod error;
mod groups;
mod resolver;
mod scope;

pub use error::WorkspaceError;
pub use groups::{GroupConfig, VersionGroup};
pub use resolver::Workspace;
pub use scope::ScopeConfig;

pub type Result<T> = std::result::Result<T, WorkspaceError>;
