use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error(transparent)]
    Core(#[from] ripple_core::CoreError),

    #[error("'{path}' is not inside a git repository")]
    NotARepository { path: std::path::PathBuf },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed {
        operation: &'static str,
        stderr: String,
    },

    #[error(
        "comparison branch '{branch}' does not exist locally and fetching is disabled; \
         check the branch name, or enable fetching so it can be retrieved from the remote"
    )]
    MissingBranch { branch: String },

    #[error(
        "comparison branch '{branch}' does not exist locally and no remote could be \
         inferred; add a remote, or use a remote-qualified branch such as 'origin/main'"
    )]
    NoRemote { branch: String },

    #[error(
        "failed to fetch comparison branch '{branch}': {stderr}; if this runs in CI \
         with a shallow checkout, increase the checkout depth or fetch the branch \
         before running"
    )]
    FetchFailed { branch: String, stderr: String },

    #[error(
        "no common ancestor between HEAD and '{branch}'; the repository is complete, \
         so the histories are genuinely unrelated; verify that the comparison branch \
         and remote point at the repository this checkout came from"
    )]
    UnrelatedHistories { branch: String },

    #[error(
        "no common ancestor between HEAD and '{branch}' even after fetching the full \
         history; the branches do not share a common base; verify the comparison \
         branch and remote configuration"
    )]
    UnrelatedHistoriesComplete { branch: String },
}
