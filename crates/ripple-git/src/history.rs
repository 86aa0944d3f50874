use tracing::debug;

use crate::client::{FetchDepth, GitClient};
use crate::error::GitError;
use crate::Result;

/// Deepening attempts before falling back to a full unshallow fetch.
pub const DEEPEN_ATTEMPTS: u32 = 3;
/// Commits added per deepening attempt.
pub const DEEPEN_STEP: u32 = 100;

/// A comparison branch ref, split into its remote and branch parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRef {
    /// The ref as given, e.g. `origin/main` or `main`.
    pub full: String,
    pub remote: Option<String>,
    pub branch: String,
}

impl ComparisonRef {
    /// Splits `reference` against the repository's configured remotes. A
    /// plain branch name infers `origin` when present, or the sole remote.
    #[must_use]
    pub fn parse(reference: &str, remotes: &[String]) -> Self {
        if let Some((candidate, branch)) = reference.split_once('/')
            && remotes.iter().any(|r| r == candidate)
        {
            return Self {
                full: reference.to_string(),
                remote: Some(candidate.to_string()),
                branch: branch.to_string(),
            };
        }

        let inferred = if remotes.iter().any(|r| r == "origin") {
            Some("origin".to_string())
        } else if let [only] = remotes {
            Some(only.clone())
        } else {
            None
        };

        Self {
            full: reference.to_string(),
            remote: inferred,
            branch: reference.to_string(),
        }
    }
}

/// Guarantees a merge base exists between `HEAD` and `reference` before any
/// diffing happens.
///
/// Fetches nothing when the ref is present and a merge base already exists.
/// A missing ref is fetched (after idempotently adding the branch to the
/// remote's fetch refspecs); a missing merge base on a shallow clone triggers
/// up to [`DEEPEN_ATTEMPTS`] deepenings of [`DEEPEN_STEP`] commits, then one
/// unconditional unshallow fetch.
///
/// # Errors
///
/// Fatal on a locally missing branch with fetching disabled, an uninferable
/// remote, a failed fetch, or unrelated histories.
pub fn ensure_shared_history(
    git: &dyn GitClient,
    reference: &str,
    fetch_enabled: bool,
    depth: Option<u32>,
) -> Result<()> {
    if !git.ref_exists(reference)? {
        if !fetch_enabled {
            return Err(GitError::MissingBranch {
                branch: reference.to_string(),
            });
        }
        fetch_missing_ref(git, reference, depth)?;
    }

    if git.merge_base("HEAD", reference)?.is_some() {
        debug!(reference, "merge base present, no fetch needed");
        return Ok(());
    }

    if !git.is_shallow()? {
        return Err(GitError::UnrelatedHistories {
            branch: reference.to_string(),
        });
    }

    let parsed = ComparisonRef::parse(reference, &git.remotes()?);
    for attempt in 1..=DEEPEN_ATTEMPTS {
        debug!(reference, attempt, step = DEEPEN_STEP, "deepening shallow clone");
        git.fetch(parsed.remote.as_deref(), None, FetchDepth::Deepen(DEEPEN_STEP))?;
        if git.merge_base("HEAD", reference)?.is_some() {
            return Ok(());
        }
        if !git.is_shallow()? {
            // deepening completed the history without finding a base
            return Err(GitError::UnrelatedHistoriesComplete {
                branch: reference.to_string(),
            });
        }
    }

    debug!(reference, "still shallow after deepening, unshallowing fully");
    git.fetch(parsed.remote.as_deref(), None, FetchDepth::Unshallow)?;
    if git.merge_base("HEAD", reference)?.is_some() {
        return Ok(());
    }

    Err(GitError::UnrelatedHistoriesComplete {
        branch: reference.to_string(),
    })
}

fn fetch_missing_ref(git: &dyn GitClient, reference: &str, depth: Option<u32>) -> Result<()> {
    let parsed = ComparisonRef::parse(reference, &git.remotes()?);
    let Some(remote) = parsed.remote.as_deref() else {
        return Err(GitError::NoRemote {
            branch: reference.to_string(),
        });
    };

    ensure_branch_in_fetch_config(git, remote, &parsed.branch)?;

    // passing a depth on a full clone would convert it to a shallow one
    let fetch_depth = if let Some(d) = depth
        && git.is_shallow()?
    {
        FetchDepth::Depth(d)
    } else {
        FetchDepth::Full
    };
    let result = git.fetch(Some(remote), Some(&parsed.branch), fetch_depth)?;
    if !result.success {
        return Err(GitError::FetchFailed {
            branch: reference.to_string(),
            stderr: result.stderr.trim().to_string(),
        });
    }

    if !git.ref_exists(reference)? {
        return Err(GitError::FetchFailed {
            branch: reference.to_string(),
            stderr: "fetch succeeded but the ref is still absent".to_string(),
        });
    }
    Ok(())
}

/// Adds `branch` to the remote's fetch refspecs when no existing refspec
/// already covers it. Safe to call repeatedly.
fn ensure_branch_in_fetch_config(git: &dyn GitClient, remote: &str, branch: &str) -> Result<()> {
    let key = format!("remote.{remote}.fetch");
    let wanted = format!("+refs/heads/{branch}:refs/remotes/{remote}/{branch}");
    let wildcard = format!("+refs/heads/*:refs/remotes/{remote}/*");

    let existing = git.config_get_all(&key)?;
    if existing.iter().any(|spec| spec == &wanted || spec == &wildcard) {
        return Ok(());
    }

    debug!(remote, branch, "adding branch to fetch configuration");
    git.config_add(&key, &wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGit;

    fn remotes(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    mod comparison_ref {
        use super::*;

        #[test]
        fn remote_qualified_ref_splits() {
            let parsed = ComparisonRef::parse("origin/main", &remotes(&["origin"]));
            assert_eq!(parsed.remote.as_deref(), Some("origin"));
            assert_eq!(parsed.branch, "main");
        }

        #[test]
        fn slash_without_matching_remote_is_a_branch_name() {
            let parsed = ComparisonRef::parse("feature/main", &remotes(&["origin"]));
            assert_eq!(parsed.remote.as_deref(), Some("origin"));
            assert_eq!(parsed.branch, "feature/main");
        }

        #[test]
        fn sole_remote_is_inferred() {
            let parsed = ComparisonRef::parse("main", &remotes(&["upstream"]));
            assert_eq!(parsed.remote.as_deref(), Some("upstream"));
        }

        #[test]
        fn no_remotes_means_none() {
            let parsed = ComparisonRef::parse("main", &[]);
            assert_eq!(parsed.remote, None);
        }
    }

    #[test]
    fn existing_merge_base_fetches_nothing() {
        let git = ScriptedGit::new()
            .with_ref("origin/main")
            .with_merge_bases(vec![Some("abc".to_string())]);

        ensure_shared_history(&git, "origin/main", true, None).expect("shared history");

        assert_eq!(git.fetch_count(), 0);
    }

    #[test]
    fn missing_ref_with_fetch_disabled_is_fatal() {
        let git = ScriptedGit::new();

        let result = ensure_shared_history(&git, "origin/main", false, None);

        assert!(matches!(result, Err(GitError::MissingBranch { .. })));
        assert_eq!(git.fetch_count(), 0);
    }

    #[test]
    fn missing_ref_without_remote_is_fatal() {
        let git = ScriptedGit::new().with_remotes(&[]);

        let result = ensure_shared_history(&git, "main", true, None);

        assert!(matches!(result, Err(GitError::NoRemote { .. })));
    }

    #[test]
    fn missing_ref_is_fetched_and_fetch_config_updated() {
        let git = ScriptedGit::new()
            .with_remotes(&["origin"])
            .with_ref_appearing_after_fetch("origin/main")
            .with_merge_bases(vec![Some("abc".to_string())]);

        ensure_shared_history(&git, "origin/main", true, None).expect("shared history");

        assert_eq!(git.fetch_count(), 1);
        let config = git.config_values("remote.origin.fetch");
        assert_eq!(
            config,
            vec!["+refs/heads/main:refs/remotes/origin/main".to_string()]
        );
    }

    #[test]
    fn fetch_config_add_is_idempotent() {
        let git = ScriptedGit::new()
            .with_remotes(&["origin"])
            .with_config(
                "remote.origin.fetch",
                "+refs/heads/main:refs/remotes/origin/main",
            )
            .with_ref_appearing_after_fetch("origin/main")
            .with_merge_bases(vec![Some("abc".to_string())]);

        ensure_shared_history(&git, "origin/main", true, None).expect("shared history");

        assert_eq!(git.config_values("remote.origin.fetch").len(), 1);
    }

    #[test]
    fn depth_is_only_passed_to_an_already_shallow_clone() {
        let git = ScriptedGit::new()
            .with_remotes(&["origin"])
            .with_ref_appearing_after_fetch("origin/main")
            .with_merge_bases(vec![Some("abc".to_string())]);

        ensure_shared_history(&git, "origin/main", true, Some(25)).expect("shared history");

        // full clone: the depth hint must not be forwarded
        assert_eq!(git.fetch_depths(), vec![FetchDepth::Full]);
    }

    #[test]
    fn no_merge_base_on_full_clone_is_unrelated_histories() {
        let git = ScriptedGit::new()
            .with_ref("origin/main")
            .with_merge_bases(vec![None]);

        let result = ensure_shared_history(&git, "origin/main", true, None);

        assert!(matches!(result, Err(GitError::UnrelatedHistories { .. })));
    }

    #[test]
    fn shallow_clone_deepens_until_merge_base_found() {
        // first test fails, two deepen passes, third test succeeds
        let git = ScriptedGit::new()
            .with_ref("origin/main")
            .with_remotes(&["origin"])
            .with_shallow(true)
            .with_merge_bases(vec![None, None, Some("abc".to_string())]);

        ensure_shared_history(&git, "origin/main", true, None).expect("shared history");

        assert_eq!(
            git.fetch_depths(),
            vec![
                FetchDepth::Deepen(DEEPEN_STEP),
                FetchDepth::Deepen(DEEPEN_STEP),
            ]
        );
    }

    #[test]
    fn exhausted_deepening_falls_back_to_unshallow() {
        let git = ScriptedGit::new()
            .with_ref("origin/main")
            .with_remotes(&["origin"])
            .with_shallow(true)
            .with_merge_bases(vec![None, None, None, None, Some("abc".to_string())]);

        ensure_shared_history(&git, "origin/main", true, None).expect("shared history");

        assert_eq!(
            git.fetch_depths(),
            vec![
                FetchDepth::Deepen(DEEPEN_STEP),
                FetchDepth::Deepen(DEEPEN_STEP),
                FetchDepth::Deepen(DEEPEN_STEP),
                FetchDepth::Unshallow,
            ]
        );
    }

    #[test]
    fn unshallowed_repo_without_merge_base_is_definitively_unrelated() {
        let git = ScriptedGit::new()
            .with_ref("origin/main")
            .with_remotes(&["origin"])
            .with_shallow(true)
            .with_merge_bases(vec![None, None, None, None, None]);

        let result = ensure_shared_history(&git, "origin/main", true, None);

        assert!(matches!(
            result,
            Err(GitError::UnrelatedHistoriesComplete { .. })
        ));
    }
}
