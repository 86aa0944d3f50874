use std::path::Path;

use clap::Args;
use ripple_operations::JsonChangelogWriter;
use ripple_operations::operations::bump;

use crate::commands::open_session;
use crate::error::CliError;

#[derive(Args)]
pub struct BumpArgs {
    /// Comparison branch for the --since boundary
    #[arg(long)]
    branch: Option<String>,

    /// Only consume change records introduced after this ref
    #[arg(long)]
    since: Option<String>,

    /// Compute and print the decision without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Keep consumed change records on disk
    #[arg(long)]
    keep_records: bool,

    /// Do not propagate bumps to dependent packages
    #[arg(long)]
    no_dependent_bumps: bool,

    /// Prerelease identifier for prerelease-kind bumps
    #[arg(long)]
    prerelease_id: Option<String>,
}

pub fn run(args: &BumpArgs, start_path: &Path) -> Result<(), CliError> {
    let mut session = open_session(start_path)?;
    if let Some(branch) = &args.branch {
        session.config.branch = branch.clone();
    }
    if let Some(since) = &args.since {
        session.config.since = Some(since.clone());
    }
    if let Some(id) = &args.prerelease_id {
        session.config.prerelease_id = id.clone();
    }
    session.config.dry_run = args.dry_run;
    session.config.keep_records |= args.keep_records;
    if args.no_dependent_bumps {
        session.config.bump_dependents = false;
    }

    let outcome = bump(
        &session.workspace,
        &session.git,
        &JsonChangelogWriter,
        &session.config,
    )?;

    if outcome.decision.versions.is_empty() {
        println!("no pending change records; nothing to bump");
        return Ok(());
    }

    let banner = if args.dry_run { "would bump" } else { "bumped" };
    for (name, version) in &outcome.decision.versions {
        let current = session
            .workspace
            .get(name)
            .map_or_else(|| "?".to_string(), |m| m.version.to_string());
        println!(
            "{banner} {name}: {current} -> {version} ({})",
            outcome.decision.kind_of(name)
        );
    }
    Ok(())
}
