//! A scripted [`GitClient`] for exercising the assurance and publish
//! protocols without a real repository.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ripple_core::CommandResult;

use crate::client::{FetchDepth, FileChange, GitClient};
use crate::Result;

fn ok() -> CommandResult {
    CommandResult {
        success: true,
        stdout: String::new(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

fn rejected(stderr: &str) -> CommandResult {
    CommandResult {
        success: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: Some(1),
    }
}

/// One recorded fetch invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub depth: FetchDepth,
}

pub struct ScriptedGit {
    root: PathBuf,
    branch: String,
    head: String,
    refs: Mutex<HashSet<String>>,
    refs_after_fetch: Mutex<Vec<String>>,
    remotes: Vec<String>,
    shallow: Mutex<bool>,
    merge_bases: Mutex<VecDeque<Option<String>>>,
    config: Mutex<BTreeMap<String, Vec<String>>>,
    fetches: Mutex<Vec<FetchCall>>,
    push_results: Mutex<VecDeque<bool>>,
    tracked_files: Vec<PathBuf>,
    diffs: Vec<FileChange>,
    introduced: BTreeMap<PathBuf, String>,
    calls: Mutex<Vec<String>>,
}

impl Default for ScriptedGit {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGit {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/scripted/repo"),
            branch: "main".to_string(),
            head: "0123456789abcdef0123456789abcdef01234567".to_string(),
            refs: Mutex::new(HashSet::new()),
            refs_after_fetch: Mutex::new(Vec::new()),
            remotes: vec!["origin".to_string()],
            shallow: Mutex::new(false),
            merge_bases: Mutex::new(VecDeque::new()),
            config: Mutex::new(BTreeMap::new()),
            fetches: Mutex::new(Vec::new()),
            push_results: Mutex::new(VecDeque::new()),
            tracked_files: Vec::new(),
            diffs: Vec::new(),
            introduced: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_ref(self, reference: &str) -> Self {
        self.refs
            .lock()
            .expect("lock poisoned")
            .insert(reference.to_string());
        self
    }

    /// The ref becomes visible only after a fetch, like a branch that lives on
    /// the remote.
    #[must_use]
    pub fn with_ref_appearing_after_fetch(self, reference: &str) -> Self {
        self.refs_after_fetch
            .lock()
            .expect("lock poisoned")
            .push(reference.to_string());
        self
    }

    #[must_use]
    pub fn with_remotes(mut self, remotes: &[&str]) -> Self {
        self.remotes = remotes.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_shallow(self, shallow: bool) -> Self {
        *self.shallow.lock().expect("lock poisoned") = shallow;
        self
    }

    /// Queues the answers `merge_base` gives, in call order; the queue
    /// exhausting means "no merge base".
    #[must_use]
    pub fn with_merge_bases(self, bases: Vec<Option<String>>) -> Self {
        *self.merge_bases.lock().expect("lock poisoned") = bases.into();
        self
    }

    #[must_use]
    pub fn with_config(self, key: &str, value: &str) -> Self {
        self.config
            .lock()
            .expect("lock poisoned")
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Queues push outcomes, in call order; the queue exhausting means
    /// success.
    #[must_use]
    pub fn with_push_results(self, results: Vec<bool>) -> Self {
        *self.push_results.lock().expect("lock poisoned") = results.into();
        self
    }

    #[must_use]
    pub fn with_tracked_files(mut self, files: Vec<PathBuf>) -> Self {
        self.tracked_files = files;
        self
    }

    #[must_use]
    pub fn with_diffs(mut self, diffs: Vec<FileChange>) -> Self {
        self.diffs = diffs;
        self
    }

    #[must_use]
    pub fn with_introducing_commit(mut self, path: &str, hash: &str) -> Self {
        self.introduced
            .insert(PathBuf::from(path), hash.to_string());
        self
    }

    #[must_use]
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("lock poisoned").push(call.into());
    }

    /// Every mutating call, in order, rendered as `"op args"` strings.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().expect("lock poisoned").len()
    }

    #[must_use]
    pub fn fetch_depths(&self) -> Vec<FetchDepth> {
        self.fetches
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|f| f.depth)
            .collect()
    }

    #[must_use]
    pub fn config_values(&self, key: &str) -> Vec<String> {
        self.config
            .lock()
            .expect("lock poisoned")
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

impl GitClient for ScriptedGit {
    fn root(&self) -> &Path {
        &self.root
    }

    fn ref_exists(&self, reference: &str) -> Result<bool> {
        Ok(self
            .refs
            .lock()
            .expect("lock poisoned")
            .contains(reference))
    }

    fn head_commit(&self) -> Result<String> {
        Ok(self.head.clone())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn config_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .config
            .lock()
            .expect("lock poisoned")
            .get(key)
            .and_then(|values| values.first().cloned()))
    }

    fn config_get_all(&self, key: &str) -> Result<Vec<String>> {
        Ok(self.config_values(key))
    }

    fn config_add(&self, key: &str, value: &str) -> Result<()> {
        self.record(format!("config-add {key} {value}"));
        self.config
            .lock()
            .expect("lock poisoned")
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        Ok(())
    }

    fn remotes(&self) -> Result<Vec<String>> {
        Ok(self.remotes.clone())
    }

    fn is_shallow(&self) -> Result<bool> {
        Ok(*self.shallow.lock().expect("lock poisoned"))
    }

    fn merge_base(&self, _a: &str, _b: &str) -> Result<Option<String>> {
        Ok(self
            .merge_bases
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .flatten())
    }

    fn fetch(
        &self,
        remote: Option<&str>,
        branch: Option<&str>,
        depth: FetchDepth,
    ) -> Result<CommandResult> {
        self.record(format!("fetch {remote:?} {branch:?} {depth:?}"));
        self.fetches.lock().expect("lock poisoned").push(FetchCall {
            remote: remote.map(ToString::to_string),
            branch: branch.map(ToString::to_string),
            depth,
        });
        if depth == FetchDepth::Unshallow {
            *self.shallow.lock().expect("lock poisoned") = false;
        }
        let mut refs = self.refs.lock().expect("lock poisoned");
        for reference in self.refs_after_fetch.lock().expect("lock poisoned").drain(..) {
            refs.insert(reference);
        }
        Ok(ok())
    }

    fn list_tracked_files(&self, _patterns: &[&str]) -> Result<Vec<PathBuf>> {
        Ok(self.tracked_files.clone())
    }

    fn name_status_diff(&self, _base: &str) -> Result<Vec<FileChange>> {
        Ok(self.diffs.clone())
    }

    fn commit_introducing(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.introduced.get(path).cloned())
    }

    fn checkout(&self, target: &str) -> Result<CommandResult> {
        self.record(format!("checkout {target}"));
        Ok(ok())
    }

    fn create_branch(&self, name: &str) -> Result<CommandResult> {
        self.record(format!("create-branch {name}"));
        Ok(ok())
    }

    fn delete_branch(&self, name: &str) -> Result<CommandResult> {
        self.record(format!("delete-branch {name}"));
        Ok(ok())
    }

    fn discard_changes(&self) -> Result<CommandResult> {
        self.record("discard-changes");
        Ok(ok())
    }

    fn stage_all(&self) -> Result<CommandResult> {
        self.record("stage-all");
        Ok(ok())
    }

    fn commit(&self, message: &str) -> Result<CommandResult> {
        self.record(format!("commit {message}"));
        Ok(ok())
    }

    fn tag(&self, name: &str, _message: &str) -> Result<CommandResult> {
        self.record(format!("tag {name}"));
        Ok(ok())
    }

    fn merge_prefer_incoming(&self, reference: &str) -> Result<CommandResult> {
        self.record(format!("merge-theirs {reference}"));
        Ok(ok())
    }

    fn push(&self, remote: &str, refspec: &str) -> Result<CommandResult> {
        self.record(format!("push {remote} {refspec}"));
        let success = self
            .push_results
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or(true);
        if success {
            Ok(ok())
        } else {
            Ok(rejected(
                "! [rejected] main -> main (fetch first)",
            ))
        }
    }
}
