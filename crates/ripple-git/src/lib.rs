mod client;
mod error;
mod history;
mod system;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{FetchDepth, FileChange, FileStatus, GitClient};
pub use error::GitError;
pub use history::{ComparisonRef, DEEPEN_ATTEMPTS, DEEPEN_STEP, ensure_shared_history};
pub use system::SystemGit;

pub type Result<T> = std::result::Result<T, GitError>;
