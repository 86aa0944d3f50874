use std::path::Path;

use ripple_operations::RunConfig;

use crate::error::CliError;

/// Repo-level configuration file, merged under command-line flags.
pub const CONFIG_FILE: &str = ".ripple.json";

/// Loads `.ripple.json` from the repository root; a missing file yields the
/// defaults.
pub fn load_run_config(root: &Path) -> Result<RunConfig, CliError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(RunConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| CliError::ConfigRead {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::ConfigParse { path, source })
}
