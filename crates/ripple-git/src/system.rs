use std::path::{Path, PathBuf};

use ripple_core::{CommandResult, run_command};

use crate::client::{FetchDepth, FileChange, FileStatus, GitClient};
use crate::error::GitError;
use crate::Result;

/// [`GitClient`] backed by the system `git` binary.
pub struct SystemGit {
    root: PathBuf,
}

impl SystemGit {
    /// Opens the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotARepository`] if `path` is not inside a work
    /// tree.
    pub fn open(path: &Path) -> Result<Self> {
        let result = run_command("git", &["rev-parse", "--show-toplevel"], path)?;
        if !result.success {
            return Err(GitError::NotARepository {
                path: path.to_path_buf(),
            });
        }
        let root = dunce::simplified(Path::new(result.trimmed_stdout())).to_path_buf();
        Ok(Self { root })
    }

    fn git(&self, args: &[&str]) -> Result<CommandResult> {
        Ok(run_command("git", args, &self.root)?)
    }

    fn git_ok(&self, operation: &'static str, args: &[&str]) -> Result<CommandResult> {
        let result = self.git(args)?;
        if result.success {
            Ok(result)
        } else {
            Err(GitError::CommandFailed {
                operation,
                stderr: result.stderr.trim().to_string(),
            })
        }
    }
}

impl GitClient for SystemGit {
    fn root(&self) -> &Path {
        &self.root
    }

    fn ref_exists(&self, reference: &str) -> Result<bool> {
        let probe = format!("{reference}^{{commit}}");
        Ok(self
            .git(&["rev-parse", "--verify", "--quiet", &probe])?
            .success)
    }

    fn head_commit(&self) -> Result<String> {
        let result = self.git_ok("rev-parse", &["rev-parse", "HEAD"])?;
        Ok(result.trimmed_stdout().to_string())
    }

    fn current_branch(&self) -> Result<String> {
        let result = self.git_ok("rev-parse", &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(result.trimmed_stdout().to_string())
    }

    fn config_get(&self, key: &str) -> Result<Option<String>> {
        let result = self.git(&["config", "--get", key])?;
        if result.success {
            Ok(Some(result.trimmed_stdout().to_string()))
        } else {
            Ok(None)
        }
    }

    fn config_get_all(&self, key: &str) -> Result<Vec<String>> {
        let result = self.git(&["config", "--get-all", key])?;
        Ok(result
            .stdout_lines()
            .into_iter()
            .map(ToString::to_string)
            .collect())
    }

    fn config_add(&self, key: &str, value: &str) -> Result<()> {
        self.git_ok("config", &["config", "--add", key, value])?;
        Ok(())
    }

    fn remotes(&self) -> Result<Vec<String>> {
        let result = self.git_ok("remote", &["remote"])?;
        Ok(result
            .stdout_lines()
            .into_iter()
            .map(ToString::to_string)
            .collect())
    }

    fn is_shallow(&self) -> Result<bool> {
        let result = self.git_ok(
            "rev-parse",
            &["rev-parse", "--is-shallow-repository"],
        )?;
        Ok(result.trimmed_stdout() == "true")
    }

    fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>> {
        let result = self.git(&["merge-base", a, b])?;
        if result.success {
            Ok(Some(result.trimmed_stdout().to_string()))
        } else {
            Ok(None)
        }
    }

    fn fetch(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        depth: FetchDepth,
    ) -> Result<CommandResult> {
        let mut args = vec!["fetch".to_string()];
        match depth {
            FetchDepth::Full => {}
            FetchDepth::Depth(n) => args.push(format!("--depth={n}")),
            FetchDepth::Deepen(n) => args.push(format!("--deepen={n}")),
            FetchDepth::Unshallow => args.push("--unshallow".to_string()),
        }
        if let Some(remote) = remote {
            args.push(remote.to_string());
            if let Some(branch) = branch {
                args.push(branch.to_string());
            }
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.git(&args)
    }

    fn list_tracked_files(&self, patterns: &[&str]) -> Result<Vec<PathBuf>> {
        let mut args = vec!["ls-files", "--"];
        args.extend_from_slice(patterns);
        let result = self.git_ok("ls-files", &args)?;
        Ok(result
            .stdout_lines()
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }

    fn name_status_diff(&self, base: &str) -> Result<Vec<FileChange>> {
        let range = format!("{base}...HEAD");
        let result = self.git_ok("diff", &["diff", "--name-status", &range])?;
        Ok(result
            .stdout_lines()
            .into_iter()
            .filter_map(parse_name_status_line)
            .collect())
    }

    fn commit_introducing(&self, path: &Path) -> Result<Option<String>> {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let rel = rel.to_string_lossy();
        let result = self.git(&["log", "--diff-filter=A", "--format=%H", "--", &rel])?;
        // oldest add wins so later edits never move the hash
        Ok(result
            .stdout_lines()
            .last()
            .map(ToString::to_string))
    }

    fn checkout(&self, target: &str) -> Result<CommandResult> {
        self.git(&["checkout", target])
    }

    fn create_branch(&self, name: &str) -> Result<CommandResult> {
        self.git(&["checkout", "-b", name])
    }

    fn delete_branch(&self, name: &str) -> Result<CommandResult> {
        self.git(&["branch", "-D", name])
    }

    fn discard_changes(&self) -> Result<CommandResult> {
        self.git(&["checkout", "--", "."])
    }

    fn stage_all(&self) -> Result<CommandResult> {
        self.git(&["add", "-A"])
    }

    fn commit(&self, message: &str) -> Result<CommandResult> {
        self.git(&["commit", "-m", message, "--no-verify"])
    }

    fn tag(&self, name: &str, message: &str) -> Result<CommandResult> {
        self.git(&["tag", "-a", name, "-m", message])
    }

    fn merge_prefer_incoming(&self, reference: &str) -> Result<CommandResult> {
        self.git(&["merge", "-X", "theirs", "--no-edit", reference])
    }

    fn push(&self, remote: &str, refspec: &str) -> Result<CommandResult> {
        self.git(&["push", "--follow-tags", "--verbose", remote, refspec])
    }
}

fn parse_name_status_line(line: &str) -> Option<FileChange> {
    let mut fields = line.split('\t');
    let status_code = fields.next()?;
    // renames list old then new path; the new path is authoritative
    let path = fields.last()?;
    let status = match status_code.chars().next()? {
        'A' => FileStatus::Added,
        'M' => FileStatus::Modified,
        'D' => FileStatus::Deleted,
        'R' => FileStatus::Renamed,
        _ => FileStatus::Other,
    };
    Some(FileChange {
        status,
        path: PathBuf::from(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn setup_test_repo() -> anyhow::Result<(tempfile::TempDir, SystemGit)> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path();
        for args in [
            vec!["init", "-q", "-b", "main"],
            vec!["config", "user.name", "Test"],
            vec!["config", "user.email", "test@example.com"],
        ] {
            let result = run_command("git", &args, path)?;
            anyhow::ensure!(result.success, "git {args:?}: {}", result.stderr);
        }
        std::fs::write(path.join("README.md"), "seed\n")?;
        for args in [vec!["add", "-A"], vec!["commit", "-q", "-m", "initial"]] {
            let result = run_command("git", &args, path)?;
            anyhow::ensure!(result.success, "git {args:?}: {}", result.stderr);
        }
        let git = SystemGit::open(path)?;
        Ok((dir, git))
    }

    #[test]
    fn open_rejects_non_repository() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        assert!(matches!(
            SystemGit::open(dir.path()),
            Err(GitError::NotARepository { .. })
        ));
        Ok(())
    }

    #[test]
    fn head_and_branch_resolve() -> anyhow::Result<()> {
        let (_dir, git) = setup_test_repo()?;
        assert_eq!(git.current_branch()?, "main");
        assert_eq!(git.head_commit()?.len(), 40);
        assert!(git.ref_exists("HEAD")?);
        assert!(!git.ref_exists("origin/main")?);
        Ok(())
    }

    #[test]
    fn tracked_files_and_introducing_commit() -> anyhow::Result<()> {
        let (dir, git) = setup_test_repo()?;
        std::fs::write(dir.path().join("package.json"), "{}\n")?;
        run_command("git", &["add", "-A"], dir.path())?;
        run_command("git", &["commit", "-q", "-m", "add manifest"], dir.path())?;
        let introduced = git
            .commit_introducing(Path::new("package.json"))?
            .expect("file committed");

        // editing the file must not move the introducing hash
        std::fs::write(dir.path().join("package.json"), "{ \"edited\": true }\n")?;
        run_command("git", &["add", "-A"], dir.path())?;
        run_command("git", &["commit", "-q", "-m", "edit manifest"], dir.path())?;

        let files = git.list_tracked_files(&["package.json"])?;
        assert_eq!(files, vec![PathBuf::from("package.json")]);
        assert_eq!(
            git.commit_introducing(Path::new("package.json"))?,
            Some(introduced)
        );
        Ok(())
    }

    #[test]
    fn name_status_parses_adds_and_renames() {
        assert_eq!(
            parse_name_status_line("A\tpackages/a/package.json"),
            Some(FileChange {
                status: FileStatus::Added,
                path: PathBuf::from("packages/a/package.json"),
            })
        );
        assert_eq!(
            parse_name_status_line("R100\told.json\tnew.json"),
            Some(FileChange {
                status: FileStatus::Renamed,
                path: PathBuf::from("new.json"),
            })
        );
        assert_eq!(parse_name_status_line(""), None);
    }

    #[test]
    fn merge_base_of_unrelated_ref_is_none() -> anyhow::Result<()> {
        let (_dir, git) = setup_test_repo()?;
        assert!(git.merge_base("HEAD", "HEAD")?.is_some());
        assert!(git.merge_base("HEAD", "does-not-exist")?.is_none());
        Ok(())
    }

    #[test]
    fn full_clone_is_not_shallow() -> anyhow::Result<()> {
        let (_dir, git) = setup_test_repo()?;
        assert!(!git.is_shallow()?);
        Ok(())
    }
}
