use std::path::{Path, PathBuf};

use ripple_core::CommandResult;

use crate::Result;

/// Depth control for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDepth {
    Full,
    Depth(u32),
    Deepen(u32),
    Unshallow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub status: FileStatus,
    pub path: PathBuf,
}

/// The version-control collaborator.
///
/// Every operation is a blocking subprocess call returning uniform
/// [`CommandResult`]-derived data; implementations never interpret success
/// beyond exit status, so callers decide what is fatal. The scope resolver,
/// assurance protocol and publish protocol all run against this trait, which
/// keeps them unit-testable without a real repository.
pub trait GitClient: Send + Sync {
    fn root(&self) -> &Path;

    fn ref_exists(&self, reference: &str) -> Result<bool>;
    fn head_commit(&self) -> Result<String>;
    fn current_branch(&self) -> Result<String>;

    fn config_get(&self, key: &str) -> Result<Option<String>>;
    fn config_get_all(&self, key: &str) -> Result<Vec<String>>;
    fn config_add(&self, key: &str, value: &str) -> Result<()>;
    fn remotes(&self) -> Result<Vec<String>>;

    fn is_shallow(&self) -> Result<bool>;
    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>>;
    fn fetch(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        depth: FetchDepth,
    ) -> Result<CommandResult>;

    fn list_tracked_files(&self, patterns: &[&str]) -> Result<Vec<PathBuf>>;
    /// Name-status diff of `HEAD` against the merge base with `base`.
    fn name_status_diff(&self, base: &str) -> Result<Vec<FileChange>>;
    /// Hash of the commit that first added `path`, if it is committed at all.
    fn commit_introducing(&self, path: &Path) -> Result<Option<String>>;

    fn checkout(&self, target: &str) -> Result<CommandResult>;
    fn create_branch(&self, name: &str) -> Result<CommandResult>;
    fn delete_branch(&self, name: &str) -> Result<CommandResult>;
    /// Reverts uncommitted changes to tracked files.
    fn discard_changes(&self) -> Result<CommandResult>;
    fn stage_all(&self) -> Result<CommandResult>;
    fn commit(&self, message: &str) -> Result<CommandResult>;
    fn tag(&self, name: &str, message: &str) -> Result<CommandResult>;
    /// Merges `reference`, resolving conflicts in favour of the incoming side.
    fn merge_prefer_incoming(&self, reference: &str) -> Result<CommandResult>;
    /// Pushes `refspec` with `--follow-tags`; never forces.
    fn push(&self, remote: &str, refspec: &str) -> Result<CommandResult>;
}
