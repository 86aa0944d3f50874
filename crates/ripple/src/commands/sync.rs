use std::path::Path;

use clap::Args;
use ripple_operations::operations::sync;
use ripple_registry::{NpmClient, VersionCache};

use crate::commands::open_session;
use crate::error::CliError;

#[derive(Args)]
pub struct SyncArgs {
    /// Registry URL
    #[arg(long)]
    registry: Option<String>,

    /// Registry auth token
    #[arg(long)]
    token: Option<String>,

    /// Adopt the registry version even when the local one is ahead
    #[arg(long)]
    force: bool,

    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,
}

pub fn run(args: &SyncArgs, start_path: &Path) -> Result<(), CliError> {
    let mut session = open_session(start_path)?;
    if let Some(url) = &args.registry {
        session.config.registry.url = Some(url.clone());
    }
    if let Some(token) = &args.token {
        session.config.registry.token = Some(token.clone());
    }
    session.config.dry_run |= args.dry_run;

    let client = NpmClient::new(
        session.config.registry.url.clone(),
        session.config.registry.token.clone(),
    );
    let mut cache = VersionCache::new();

    let changes = sync(
        &session.workspace,
        &client,
        &session.config,
        &mut cache,
        args.force,
    )?;

    if changes.is_empty() {
        println!("all manifest versions match the registry");
        return Ok(());
    }
    let banner = if session.config.dry_run {
        "would sync"
    } else {
        "synced"
    };
    for change in changes {
        println!(
            "{banner} {}: {} -> {}",
            change.name, change.local, change.registry
        );
    }
    Ok(())
}
