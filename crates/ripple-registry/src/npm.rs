use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use ripple_core::{CommandResult, CoreError, run_command};
use semver::Version;
use tracing::{debug, warn};

use crate::client::{PublishRequest, RegistryClient};
use crate::error::RegistryError;
use crate::Result;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// [`RegistryClient`] backed by the `npm` binary.
pub struct NpmClient {
    registry: Option<String>,
    token: Option<String>,
    /// Per-attempt timeout for `npm publish`.
    timeout: Duration,
    /// Publish attempts per package.
    attempts: u32,
}

impl NpmClient {
    #[must_use]
    pub fn new(registry: Option<String>, token: Option<String>) -> Self {
        Self {
            registry,
            token,
            timeout: Duration::from_secs(120),
            attempts: 3,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    fn registry_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(registry) = &self.registry {
            args.push(format!("--registry={registry}"));
        }
        if let (Some(token), Some(registry)) = (&self.token, &self.registry)
            && let Some(host_path) = registry
                .strip_prefix("https:")
                .or_else(|| registry.strip_prefix("http:"))
        {
            let host_path = host_path.trim_end_matches('/');
            args.push(format!("--{host_path}/:_authToken={token}"));
        }
        args
    }
}

impl RegistryClient for NpmClient {
    fn publish(&self, request: &PublishRequest<'_>) -> Result<()> {
        let mut args = vec![
            "publish".to_string(),
            format!("--tag={}", request.dist_tag),
        ];
        if let Some(access) = request.access {
            args.push(format!("--access={access}"));
        }
        args.extend(self.registry_args());

        let mut last_reason = String::new();
        for attempt in 1..=self.attempts {
            let mut command = Command::new("npm");
            command.args(&args).current_dir(request.dir);

            match run_with_timeout(command, self.timeout)? {
                Some(result) if result.success => {
                    debug!(name = request.name, version = %request.version, "published");
                    return Ok(());
                }
                Some(result) => {
                    last_reason = result.stderr.trim().to_string();
                }
                None => {
                    last_reason = format!(
                        "timed out after {} seconds",
                        self.timeout.as_secs()
                    );
                }
            }
            if attempt < self.attempts {
                eprintln!("Retrying... ({attempt}/{})", self.attempts);
            }
        }

        Err(RegistryError::PublishFailed {
            name: request.name.to_string(),
            version: request.version.to_string(),
            reason: last_reason,
        })
    }

    fn list_versions(&self, name: &str) -> Result<Vec<Version>> {
        let mut args = vec![
            "view".to_string(),
            name.to_string(),
            "versions".to_string(),
            "--json".to_string(),
        ];
        args.extend(self.registry_args());
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let result = run_command("npm", &arg_refs, std::path::Path::new("."))
            .map_err(RegistryError::Core)?;

        if !result.success {
            // an unknown package is simply unpublished, not an error
            if result.stderr.contains("E404") || result.stdout.contains("E404") {
                return Ok(Vec::new());
            }
            return Err(RegistryError::ListFailed {
                name: name.to_string(),
                stderr: result.stderr.trim().to_string(),
            });
        }

        parse_versions(name, result.trimmed_stdout())
    }
}

/// A package with one release reports a bare string, several report an array.
fn parse_versions(name: &str, json: &str) -> Result<Vec<Version>> {
    if json.is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|source| RegistryError::ParseVersions {
            name: name.to_string(),
            source,
        })?;

    let raw: Vec<String> = match value {
        serde_json::Value::String(s) => vec![s],
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(ToString::to_string))
            .collect(),
        _ => Vec::new(),
    };

    Ok(raw
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(version) => Some(version),
            Err(_) => {
                warn!(name, version = %s, "skipping unparseable registry version");
                None
            }
        })
        .collect())
}

/// Runs a command with a wall-clock timeout; `None` means it was killed.
fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
) -> std::result::Result<Option<CommandResult>, CoreError> {
    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = command.spawn().map_err(|source| CoreError::CommandSpawn {
        program: "npm".to_string(),
        source,
    })?;

    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();
    let stdout_reader = std::thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(pipe) = stdout_pipe.as_mut() {
            let _ = pipe.read_to_string(&mut buffer);
        }
        buffer
    });
    let stderr_reader = std::thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(pipe) = stderr_pipe.as_mut() {
            let _ = pipe.read_to_string(&mut buffer);
        }
        buffer
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    Ok(status.map(|status| CommandResult {
        success: status.success(),
        stdout,
        stderr,
        exit_code: status.code(),
    }))
}
