use std::path::Path;
use std::process::Command;

use crate::error::CoreError;

/// Uniform result of an external command invocation.
///
/// Every VCS and registry call funnels through this shape so the callers can
/// branch on `success` and surface `stderr` without caring which tool ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandResult {
    #[must_use]
    pub fn trimmed_stdout(&self) -> &str {
        self.stdout.trim()
    }

    /// Stdout split into non-empty lines.
    #[must_use]
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// Runs `program` with `args` in `cwd` and captures its output.
///
/// A non-zero exit status is not an error here; it is reported through
/// [`CommandResult::success`] so callers decide what is fatal.
///
/// # Errors
///
/// Returns [`CoreError::CommandSpawn`] if the process cannot be started at all.
pub fn run_command(program: &str, args: &[&str], cwd: &Path) -> Result<CommandResult, CoreError> {
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| CoreError::CommandSpawn {
            program: program.to_string(),
            source,
        })?;

    Ok(CommandResult {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}
