use std::path::Path;

use semver::Version;

use crate::Result;

/// One package publication.
#[derive(Debug, Clone)]
pub struct PublishRequest<'a> {
    pub name: &'a str,
    /// Directory containing the package to publish.
    pub dir: &'a Path,
    pub version: &'a Version,
    pub dist_tag: &'a str,
    pub access: Option<&'a str>,
}

/// The package-registry collaborator.
///
/// `publish` failure is final for that package: a published version can never
/// be taken back, so callers abort rather than retry a failed run.
pub trait RegistryClient: Send + Sync {
    /// # Errors
    ///
    /// Returns an error once the bounded publish attempts are exhausted.
    fn publish(&self, request: &PublishRequest<'_>) -> Result<()>;

    /// All published versions of `name`; an empty list means the package has
    /// never been published.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be queried at all.
    fn list_versions(&self, name: &str) -> Result<Vec<Version>>;
}
