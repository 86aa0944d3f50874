use std::path::Path;

use clap::Args;
use ripple_operations::operations::check;

use crate::commands::open_session;
use crate::error::CliError;

#[derive(Args)]
pub struct CheckArgs {
    /// Comparison branch (default from config, else origin/main)
    #[arg(long)]
    branch: Option<String>,

    /// Only consider change records introduced after this ref
    #[arg(long)]
    since: Option<String>,

    /// Never fetch; fail if the comparison branch is missing locally
    #[arg(long)]
    no_fetch: bool,

    /// Fetch depth hint for shallow clones
    #[arg(long)]
    depth: Option<u32>,
}

pub fn run(args: &CheckArgs, start_path: &Path) -> Result<(), CliError> {
    let mut session = open_session(start_path)?;
    if let Some(branch) = &args.branch {
        session.config.branch = branch.clone();
    }
    if let Some(since) = &args.since {
        session.config.since = Some(since.clone());
    }
    if args.no_fetch {
        session.config.fetch = false;
    }
    if args.depth.is_some() {
        session.config.depth = args.depth;
    }

    let report = check(&session.workspace, &session.git, &session.config)?;

    if report.is_ok() {
        println!(
            "ok: {} changed package(s), all covered by change records",
            report.changed.len()
        );
        Ok(())
    } else {
        Err(CliError::MissingChangeRecords {
            changed: report.changed.len(),
            missing: report.missing.join(", "),
        })
    }
}
