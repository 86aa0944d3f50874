use std::path::PathBuf;

use indexmap::IndexMap;
use ripple_core::ChangeKind;
use semver::Version;

/// The closed set of dependency map kinds a manifest can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Runtime,
    Dev,
    Peer,
    Optional,
}

impl DependencyKind {
    pub const ALL: [Self; 4] = [Self::Runtime, Self::Dev, Self::Peer, Self::Optional];

    /// The JSON key this kind lives under in a manifest.
    #[must_use]
    pub fn manifest_key(self) -> &'static str {
        match self {
            Self::Runtime => "dependencies",
            Self::Dev => "devDependencies",
            Self::Peer => "peerDependencies",
            Self::Optional => "optionalDependencies",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Runtime => 0,
            Self::Dev => 1,
            Self::Peer => 2,
            Self::Optional => 3,
        }
    }
}

/// Fixed-size table of dependency maps, one per [`DependencyKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTable {
    maps: [IndexMap<String, String>; 4],
}

impl DependencyTable {
    #[must_use]
    pub fn get(&self, kind: DependencyKind) -> &IndexMap<String, String> {
        &self.maps[kind.index()]
    }

    pub fn insert(&mut self, kind: DependencyKind, name: String, range: String) {
        self.maps[kind.index()].insert(name, range);
    }

    /// Iterates every `(kind, dependency name, range)` entry.
    pub fn entries(&self) -> impl Iterator<Item = (DependencyKind, &str, &str)> {
        DependencyKind::ALL.into_iter().flat_map(move |kind| {
            self.get(kind)
                .iter()
                .map(move |(name, range)| (kind, name.as_str(), range.as_str()))
        })
    }

    /// Names of all dependencies across every kind, deduplicated by the caller.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries().map(|(_, name, _)| name)
    }
}

/// Per-package publish options, read from the manifest's `"ripple"` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOptions {
    /// Change kinds this package refuses; requests downgrade past them.
    pub disallowed: Vec<ChangeKind>,
    /// Registry dist-tag override for this package.
    pub tag: Option<String>,
    /// Whether publishing creates a git tag for this package.
    pub git_tags: bool,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            disallowed: Vec::new(),
            tag: None,
            git_tags: true,
        }
    }
}

/// A parsed package manifest plus the workspace facts resolved onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: Version,
    pub private: bool,
    pub dependencies: DependencyTable,
    /// Path of the manifest file itself.
    pub path: PathBuf,
    /// Version group this package resolved into, if any.
    pub group: Option<String>,
    pub options: PackageOptions,
}

impl PackageManifest {
    /// Directory containing the manifest.
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        self.path.parent().unwrap_or(std::path::Path::new(""))
    }
}
