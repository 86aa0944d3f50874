use std::path::Path;
use std::time::Duration;

use clap::Args;
use ripple_operations::JsonChangelogWriter;
use ripple_operations::operations::publish;
use ripple_registry::{NpmClient, VersionCache};

use crate::commands::open_session;
use crate::error::CliError;

#[derive(Args)]
pub struct PublishArgs {
    /// Target branch to push the release commit to
    #[arg(long)]
    branch: Option<String>,

    /// Registry URL
    #[arg(long)]
    registry: Option<String>,

    /// Registry auth token
    #[arg(long)]
    token: Option<String>,

    /// Default dist-tag for published versions
    #[arg(long = "tag")]
    dist_tag: Option<String>,

    /// Registry access level (e.g. public)
    #[arg(long)]
    access: Option<String>,

    /// Skip the registry publish phase
    #[arg(long)]
    no_publish: bool,

    /// Skip the git push phase
    #[arg(long)]
    no_push: bool,

    /// Push attempts before giving up on the race
    #[arg(long)]
    retries: Option<u32>,

    /// Per-attempt timeout for registry publishes, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Validate and compute only; neither publish nor push
    #[arg(long)]
    dry_run: bool,

    /// Do not publish packages the registry has never seen
    #[arg(long)]
    no_new_packages: bool,

    /// Never fetch; fail if the comparison branch is missing locally
    #[arg(long)]
    no_fetch: bool,

    /// Fetch depth hint for shallow clones
    #[arg(long)]
    depth: Option<u32>,

    /// Only consume change records introduced after this ref
    #[arg(long)]
    since: Option<String>,

    /// Commit message for the release commit
    #[arg(long, short = 'm')]
    message: Option<String>,
}

pub fn run(args: &PublishArgs, start_path: &Path) -> Result<(), CliError> {
    let mut session = open_session(start_path)?;
    apply_overrides(&mut session.config, args);

    let mut client = NpmClient::new(
        session.config.registry.url.clone(),
        session.config.registry.token.clone(),
    );
    if let Some(secs) = args.timeout {
        client = client.with_timeout(Duration::from_secs(secs));
    }
    let mut cache = VersionCache::new();

    let outcome = publish(
        &session.workspace,
        &session.git,
        &client,
        &JsonChangelogWriter,
        &session.config,
        &mut cache,
    )?;

    if session.config.dry_run {
        println!(
            "dry run: would release {} package(s)",
            outcome.decision.versions.len()
        );
        return Ok(());
    }
    for entry in &outcome.published {
        println!("published {entry}");
    }
    if outcome.pushed {
        println!("pushed release commit and tags to {}", session.config.branch);
    }
    Ok(())
}

fn apply_overrides(config: &mut ripple_operations::RunConfig, args: &PublishArgs) {
    if let Some(branch) = &args.branch {
        config.branch = branch.clone();
    }
    if let Some(url) = &args.registry {
        config.registry.url = Some(url.clone());
    }
    if let Some(token) = &args.token {
        config.registry.token = Some(token.clone());
    }
    if let Some(tag) = &args.dist_tag {
        config.registry.dist_tag = tag.clone();
    }
    if let Some(access) = &args.access {
        config.registry.access = Some(access.clone());
    }
    if let Some(retries) = args.retries {
        config.push_retries = retries;
    }
    if let Some(since) = &args.since {
        config.since = Some(since.clone());
    }
    if let Some(message) = &args.message {
        config.message = message.clone();
    }
    if args.depth.is_some() {
        config.depth = args.depth;
    }
    config.publish &= !args.no_publish;
    config.push &= !args.no_push;
    config.new_packages &= !args.no_new_packages;
    config.fetch &= !args.no_fetch;
    config.dry_run |= args.dry_run;
}
