//! Scripted collaborators for operation tests, in the spirit of
//! `ripple_git::testing::ScriptedGit`.

use std::collections::HashMap;
use std::sync::Mutex;

use ripple_registry::{PublishRequest, RegistryClient, RegistryError};
use semver::Version;

pub struct MockRegistry {
    known: Mutex<HashMap<String, Vec<Version>>>,
    fail_on: Option<String>,
    published: Mutex<Vec<String>>,
}

impl MockRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            known: Mutex::new(HashMap::new()),
            fail_on: None,
            published: Mutex::new(Vec::new()),
        }
    }

    /// # Panics
    ///
    /// Panics on an invalid version literal.
    #[must_use]
    pub fn with_versions(self, name: &str, versions: &[&str]) -> Self {
        self.known.lock().expect("lock poisoned").insert(
            name.to_string(),
            versions
                .iter()
                .map(|v| v.parse().expect("valid version"))
                .collect(),
        );
        self
    }

    /// Publishing `name` fails; everything before it succeeds.
    #[must_use]
    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_on = Some(name.to_string());
        self
    }

    /// `"name@version"` strings, in publish order.
    #[must_use]
    pub fn published(&self) -> Vec<String> {
        self.published.lock().expect("lock poisoned").clone()
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryClient for MockRegistry {
    fn publish(&self, request: &PublishRequest<'_>) -> Result<(), RegistryError> {
        if self.fail_on.as_deref() == Some(request.name) {
            return Err(RegistryError::PublishFailed {
                name: request.name.to_string(),
                version: request.version.to_string(),
                reason: "E403 forbidden".to_string(),
            });
        }
        self.published
            .lock()
            .expect("lock poisoned")
            .push(format!("{}@{}", request.name, request.version));
        self.known
            .lock()
            .expect("lock poisoned")
            .entry(request.name.to_string())
            .or_default()
            .push(request.version.clone());
        Ok(())
    }

    fn list_versions(&self, name: &str) -> Result<Vec<Version>, RegistryError> {
        Ok(self
            .known
            .lock()
            .expect("lock poisoned")
            .get(name)
            .cloned()
            .unwrap_or_default())
    }
}
