use std::path::PathBuf;

use ripple_core::CommandResult;
use ripple_git::{ComparisonRef, FetchDepth, GitClient, ensure_shared_history};
use ripple_registry::{PublishRequest, RegistryClient, VersionCache, prefetch_versions};
use ripple_workspace::Workspace;
use semver::Version;
use tracing::{info, warn};

use crate::apply::apply_bump;
use crate::changelog::ChangelogWriter;
use crate::error::OperationError;
use crate::loader::load_records;
use crate::planner::compute_decision;
use crate::types::{BumpDecision, RunConfig};
use crate::Result;

#[derive(Debug)]
pub struct PublishOutcome {
    pub decision: BumpDecision,
    /// `"name@version"` strings in publish order.
    pub published: Vec<String>,
    pub pushed: bool,
    pub publish_branch: String,
}

struct PublishItem {
    name: String,
    version: Version,
    dir: PathBuf,
    dist_tag: String,
    git_tag: bool,
}

/// The optimistic-concurrency release: publish irrevocably first, then race
/// the bump commit onto the shared branch with bounded, force-free retries.
///
/// Registry publication and git operations are strictly sequential; the only
/// parallelism is the read-only version prefetch. On success the run restores
/// the starting branch and deletes its disposable publish branch; every fatal
/// path leaves the branch in place and reports what was already published,
/// because published versions cannot be taken back.
///
/// # Errors
///
/// Fails on assurance fatals, validation conflicts, the first registry
/// failure, or an exhausted push race.
pub fn publish(
    workspace: &Workspace,
    git: &dyn GitClient,
    registry: &dyn RegistryClient,
    changelog: &dyn ChangelogWriter,
    config: &RunConfig,
    cache: &mut VersionCache,
) -> Result<PublishOutcome> {
    ensure_shared_history(git, &config.branch, config.fetch, config.depth)?;

    let original_branch = git.current_branch()?;
    let original_commit = git.head_commit()?;
    let publish_branch = format!(
        "ripple-publish-{}",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    );
    expect_success(git.create_branch(&publish_branch)?, "checkout -b")?;

    // one decision from the current snapshot; everything downstream reuses it
    let loaded = load_records(workspace, &config.records_dir, git, config.since.as_deref())?;
    let mut decision = compute_decision(
        workspace,
        &loaded,
        config.bump_dependents,
        &config.prerelease_id,
    );

    let lookup_names: Vec<String> = workspace
        .packages
        .values()
        .filter(|p| !p.private && workspace.in_scope(&p.name))
        .map(|p| p.name.clone())
        .collect();
    prefetch_versions(registry, &lookup_names, cache)?;
    for name in &lookup_names {
        if cache.is_unpublished(name) {
            decision.new_packages.insert(name.clone());
        }
    }

    let items = publish_items(workspace, &decision, config);

    if config.publish {
        for item in &items {
            if cache.contains(&item.name, &item.version) {
                return Err(OperationError::VersionExists {
                    name: item.name.clone(),
                    version: item.version.to_string(),
                });
            }
        }
    }

    if config.dry_run {
        info!(
            packages = items.len(),
            "dry run: skipping publish and push"
        );
        restore(git, &original_branch, &original_commit, &publish_branch)?;
        return Ok(PublishOutcome {
            decision,
            published: Vec::new(),
            pushed: false,
            publish_branch,
        });
    }

    // the bump lands on disk before publishing so artifacts carry the new
    // versions
    apply_bump(workspace, &decision, config, changelog)?;

    let mut published: Vec<String> = Vec::new();
    if config.publish {
        for item in &items {
            let request = PublishRequest {
                name: &item.name,
                dir: &item.dir,
                version: &item.version,
                dist_tag: &item.dist_tag,
                access: config.registry.access.as_deref(),
            };
            info!(name = %item.name, version = %item.version, tag = %item.dist_tag, "publishing");
            registry.publish(&request).map_err(|source| {
                OperationError::PublishAborted {
                    failed: format!("{}@{}", item.name, item.version),
                    reason: source.to_string(),
                    published: published.clone(),
                }
            })?;
            published.push(format!("{}@{}", item.name, item.version));
        }
    }

    let mut pushed = false;
    if config.push {
        expect_success(git.discard_changes()?, "checkout -- .")?;

        let parsed = ComparisonRef::parse(&config.branch, &git.remotes()?);
        let remote = parsed
            .remote
            .clone()
            .unwrap_or_else(|| "origin".to_string());
        let merge_target = format!("{remote}/{}", parsed.branch);
        let refspec = format!("HEAD:refs/heads/{}", parsed.branch);

        for attempt in 1..=config.push_retries.max(1) {
            expect_success(
                git.fetch(Some(&remote), Some(&parsed.branch), FetchDepth::Full)?,
                "fetch",
            )?;
            expect_success(git.merge_prefer_incoming(&merge_target)?, "merge")?;

            // same decision, re-applied onto the merged tree; never re-decided
            apply_bump(workspace, &decision, config, changelog)?;
            expect_success(git.stage_all()?, "add")?;
            let commit = git.commit(&config.message)?;
            if !commit.success && !nothing_to_commit(&commit) {
                return Err(OperationError::GitCommand {
                    operation: "commit".to_string(),
                    stderr: commit.stderr.trim().to_string(),
                });
            }

            for item in &items {
                if item.git_tag {
                    let tag = format!("{}_v{}", item.name, item.version);
                    expect_success(git.tag(&tag, &tag)?, "tag")?;
                }
            }

            let push = git.push(&remote, &refspec)?;
            if push.success {
                pushed = true;
                break;
            }
            warn!(
                attempt,
                retries = config.push_retries,
                "push rejected, a concurrent release won the race; re-fetching"
            );
        }

        if !pushed {
            return Err(OperationError::PushRetriesExhausted {
                attempts: config.push_retries,
                publish_branch,
                published,
            });
        }
    }

    restore(git, &original_branch, &original_commit, &publish_branch)?;
    Ok(PublishOutcome {
        decision,
        published,
        pushed,
        publish_branch,
    })
}

fn publish_items(
    workspace: &Workspace,
    decision: &BumpDecision,
    config: &RunConfig,
) -> Vec<PublishItem> {
    let mut items: Vec<PublishItem> = Vec::new();

    for (name, version) in &decision.versions {
        let Some(manifest) = workspace.get(name) else {
            continue;
        };
        if manifest.private || !workspace.in_scope(name) {
            continue;
        }
        items.push(PublishItem {
            name: name.clone(),
            version: version.clone(),
            dir: manifest.dir().to_path_buf(),
            dist_tag: manifest
                .options
                .tag
                .clone()
                .unwrap_or_else(|| config.registry.dist_tag.clone()),
            git_tag: manifest.options.git_tags,
        });
    }

    if config.new_packages {
        for name in &decision.new_packages {
            if items.iter().any(|item| &item.name == name) {
                continue;
            }
            let Some(manifest) = workspace.get(name) else {
                continue;
            };
            if manifest.private || !workspace.in_scope(name) {
                continue;
            }
            // never published before: eligible even with kind none
            items.push(PublishItem {
                name: name.clone(),
                version: decision
                    .versions
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| manifest.version.clone()),
                dir: manifest.dir().to_path_buf(),
                dist_tag: manifest
                    .options
                    .tag
                    .clone()
                    .unwrap_or_else(|| config.registry.dist_tag.clone()),
                git_tag: manifest.options.git_tags,
            });
        }
    }

    items
}

fn nothing_to_commit(result: &CommandResult) -> bool {
    result.stdout.contains("nothing to commit") || result.stderr.contains("nothing to commit")
}

fn expect_success(result: CommandResult, operation: &'static str) -> Result<CommandResult> {
    if result.success {
        Ok(result)
    } else {
        Err(OperationError::GitCommand {
            operation: operation.to_string(),
            stderr: result.stderr.trim().to_string(),
        })
    }
}

fn restore(
    git: &dyn GitClient,
    original_branch: &str,
    original_commit: &str,
    publish_branch: &str,
) -> Result<()> {
    let target = if original_branch == "HEAD" {
        original_commit
    } else {
        original_branch
    };
    expect_success(git.checkout(target)?, "checkout")?;
    expect_success(git.delete_branch(publish_branch)?, "branch -D")?;
    Ok(())
}
