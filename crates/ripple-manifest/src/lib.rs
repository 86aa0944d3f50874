mod error;
mod model;
mod range;
mod reader;
mod writer;

pub use error::ManifestError;
pub use model::{DependencyKind, DependencyTable, PackageManifest, PackageOptions};
pub use range::bump_range;
pub use reader::read_manifest;
pub use writer::{RangeUpdate, update_dependency_ranges, verify_version, write_version};

pub type Result<T> = std::result::Result<T, ManifestError>;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";
