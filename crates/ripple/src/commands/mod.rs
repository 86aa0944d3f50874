mod bump;
mod change;
mod check;
mod publish;
mod sync;

use std::path::Path;

use clap::Subcommand;
use ripple_git::{GitClient, SystemGit};
use ripple_operations::RunConfig;
use ripple_workspace::Workspace;

use crate::config::load_run_config;
use crate::error::CliError;

#[derive(Subcommand)]
pub enum Commands {
    /// Record an intended change for one or more packages
    Change(change::ChangeArgs),
    /// Verify every package changed since the comparison branch has a change record
    Check(check::CheckArgs),
    /// Apply pending change records to manifests and changelogs
    Bump(bump::BumpArgs),
    /// Publish bumped packages to the registry and push the release commit
    Publish(publish::PublishArgs),
    /// Align local manifest versions with the registry
    Sync(sync::SyncArgs),
}

impl Commands {
    pub fn execute(&self, start_path: &Path) -> Result<(), CliError> {
        match self {
            Self::Change(args) => change::run(args, start_path),
            Self::Check(args) => check::run(args, start_path),
            Self::Bump(args) => bump::run(args, start_path),
            Self::Publish(args) => publish::run(args, start_path),
            Self::Sync(args) => sync::run(args, start_path),
        }
    }
}

/// Everything a command needs: the repository, the merged config, and the
/// resolved workspace.
pub(crate) struct Session {
    pub git: SystemGit,
    pub config: RunConfig,
    pub workspace: Workspace,
}

pub(crate) fn open_session(start_path: &Path) -> Result<Session, CliError> {
    let git = SystemGit::open(start_path)?;
    let config = load_run_config(git.root())?;
    let manifest_paths =
        git.list_tracked_files(&["package.json", "*/package.json", "**/package.json"])?;
    let workspace = Workspace::resolve(
        git.root(),
        &manifest_paths,
        &config.scope,
        &config.groups,
    )?;
    Ok(Session {
        git,
        config,
        workspace,
    })
}
