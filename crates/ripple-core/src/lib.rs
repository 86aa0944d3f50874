mod command;
mod error;
mod types;
mod version;

pub use command::{CommandResult, run_command};
pub use error::CoreError;
pub use types::{ChangeKind, ChangeRecord};
pub use version::next_version;

pub type Result<T> = std::result::Result<T, CoreError>;
