use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The kind of version change a package receives.
///
/// Kinds form a strict total order `None < Prerelease < Patch < Minor < Major`;
/// the propagation engine only ever moves a package's kind upward through it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    None,
    Prerelease,
    Patch,
    Minor,
    Major,
}

impl ChangeKind {
    /// The next-lower kind in the total order. `None` stays `None`.
    #[must_use]
    pub fn next_lower(self) -> Self {
        match self {
            Self::None | Self::Prerelease => Self::None,
            Self::Patch => Self::Prerelease,
            Self::Minor => Self::Patch,
            Self::Major => Self::Minor,
        }
    }

    /// Downgrades `self` until it is not in `disallowed`, or `None`.
    ///
    /// Always terminates at an allowed kind: `None` is never disallowed.
    #[must_use]
    pub fn allowed(self, disallowed: &[ChangeKind]) -> Self {
        let mut kind = self;
        while kind != Self::None && disallowed.contains(&kind) {
            kind = kind.next_lower();
        }
        kind
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Prerelease => "prerelease",
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        };
        write!(f, "{s}")
    }
}

fn default_dependent_kind() -> Option<ChangeKind> {
    Some(ChangeKind::Patch)
}

/// One contributor's intended version impact on one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub package: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub comment: String,
    pub author: String,
    /// The kind a *dependent* of this package receives during propagation.
    #[serde(default = "default_dependent_kind")]
    pub dependent_kind: Option<ChangeKind>,
    /// Hash of the commit that introduced the record file, filled at load time.
    /// Later edits to the same file do not change it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl ChangeRecord {
    /// The kind to propagate to direct dependents.
    #[must_use]
    pub fn dependent_kind(&self) -> ChangeKind {
        self.dependent_kind.unwrap_or(ChangeKind::Patch)
    }
}
