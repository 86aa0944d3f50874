use std::path::PathBuf;

use ripple_core::{ChangeKind, ChangeRecord};
use ripple_git::GitClient;
use ripple_workspace::Workspace;

use crate::error::OperationError;
use crate::records::write_record;
use crate::types::RunConfig;
use crate::Result;

/// Flag-driven inputs for creating change records; anything missing is asked
/// through the prompter.
#[derive(Debug, Clone, Default)]
pub struct ChangeRequest {
    pub packages: Vec<String>,
    pub kind: Option<ChangeKind>,
    pub comment: Option<String>,
    pub dependent_kind: Option<ChangeKind>,
}

/// Interactive seam; the CLI provides a terminal implementation.
pub trait ChangePrompter {
    /// # Errors
    ///
    /// Returns an error when the user aborts the prompt.
    fn select_kind(&self, package: &str, disallowed: &[ChangeKind]) -> Result<ChangeKind>;

    /// # Errors
    ///
    /// Returns an error when the user aborts the prompt.
    fn input_comment(&self, package: &str) -> Result<String>;
}

/// Creates one change record per requested package.
///
/// Unknown or private targets and disallowed kinds fail fast before anything
/// is written. The record captures the author from git config and the current
/// branch for the file name; the introducing commit hash is resolved at load
/// time.
///
/// # Errors
///
/// Fails on validation errors, prompt aborts, and filesystem failures.
pub fn create_change(
    workspace: &Workspace,
    git: &dyn GitClient,
    config: &RunConfig,
    request: &ChangeRequest,
    prompter: Option<&dyn ChangePrompter>,
) -> Result<Vec<PathBuf>> {
    let author = git
        .config_get("user.email")?
        .unwrap_or_else(|| "unknown".to_string());
    let branch = git.current_branch()?;
    let records_dir = git.root().join(&config.records_dir);
    let timestamp = chrono::Utc::now();

    let mut written = Vec::new();
    for package in &request.packages {
        let Some(manifest) = workspace.get(package) else {
            return Err(OperationError::UnknownPackage {
                name: package.clone(),
                available: workspace
                    .packages
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        };
        if manifest.private {
            return Err(OperationError::PrivatePackage {
                name: package.clone(),
            });
        }

        let disallowed = workspace.disallowed_kinds(package);
        let kind = match (request.kind, prompter) {
            (Some(kind), _) => kind,
            (None, Some(prompter)) => prompter.select_kind(package, &disallowed)?,
            (None, None) => {
                return Err(OperationError::MissingKind {
                    name: package.clone(),
                });
            }
        };
        if kind != ChangeKind::None && disallowed.contains(&kind) {
            return Err(OperationError::DisallowedKind {
                name: package.clone(),
                kind,
            });
        }

        let comment = match (&request.comment, prompter) {
            (Some(comment), _) => comment.clone(),
            (None, Some(prompter)) => prompter.input_comment(package)?,
            (None, None) => return Err(OperationError::MissingComment),
        };

        let record = ChangeRecord {
            package: package.clone(),
            kind,
            comment,
            author: author.clone(),
            dependent_kind: Some(request.dependent_kind.unwrap_or(ChangeKind::Patch)),
            commit: None,
        };
        written.push(write_record(&records_dir, &record, &branch, &timestamp)?);
    }

    Ok(written)
}
