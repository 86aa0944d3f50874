mod client;
mod error;
mod lookup;
mod npm;

pub use client::{PublishRequest, RegistryClient};
pub use error::RegistryError;
pub use lookup::{LOOKUP_CONCURRENCY, VersionCache, prefetch_versions};
pub use npm::NpmClient;

pub type Result<T> = std::result::Result<T, RegistryError>;
