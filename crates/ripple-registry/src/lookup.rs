use std::collections::HashMap;

use rayon::prelude::*;
use semver::Version;
use tracing::debug;

use crate::client::RegistryClient;
use crate::Result;

/// Worker count for read-only registry lookups. Lookups are independent and
/// safe to parallelize, unlike publishes, which stay strictly sequential.
pub const LOOKUP_CONCURRENCY: usize = 5;

/// Registry version memo scoped to one run; passed explicitly, never global.
#[derive(Debug, Default)]
pub struct VersionCache {
    versions: HashMap<String, Vec<Version>>,
}

impl VersionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Version]> {
        self.versions.get(name).map(Vec::as_slice)
    }

    pub fn insert(&mut self, name: String, versions: Vec<Version>) {
        self.versions.insert(name, versions);
    }

    /// Whether `name` has never been published.
    #[must_use]
    pub fn is_unpublished(&self, name: &str) -> bool {
        self.get(name).is_some_and(<[Version]>::is_empty)
    }

    /// Whether `version` of `name` already exists in the registry.
    #[must_use]
    pub fn contains(&self, name: &str, version: &Version) -> bool {
        self.get(name).is_some_and(|v| v.contains(version))
    }
}

/// Fills `cache` for every name not already cached, using a bounded pool of
/// [`LOOKUP_CONCURRENCY`] workers.
///
/// # Errors
///
/// Returns the first lookup error; the cache keeps whatever completed.
pub fn prefetch_versions(
    client: &dyn RegistryClient,
    names: &[String],
    cache: &mut VersionCache,
) -> Result<()> {
    let missing: Vec<&String> = names
        .iter()
        .filter(|name| cache.get(name).is_none())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    debug!(count = missing.len(), "prefetching registry versions");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(LOOKUP_CONCURRENCY)
        .build()?;
    let results: Vec<(String, Result<Vec<Version>>)> = pool.install(|| {
        missing
            .par_iter()
            .map(|name| ((*name).clone(), client.list_versions(name.as_str())))
            .collect()
    });

    let mut first_error = None;
    for (name, result) in results {
        match result {
            Ok(versions) => cache.insert(name, versions),
            Err(error) if first_error.is_none() => first_error = Some(error),
            Err(_) => {}
        }
    }
    first_error.map_or(Ok(()), Err)
}
