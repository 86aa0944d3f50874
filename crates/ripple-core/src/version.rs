use semver::{BuildMetadata, Prerelease, Version};

use crate::types::ChangeKind;

/// Computes the next version for a package, semver-increment style.
///
/// `Prerelease` bumps use `prerelease_id`: a stable version gets a patch
/// increment plus `-<id>.0`; an existing prerelease with the same identifier
/// has its trailing number incremented. Stable bumps of a prerelease version
/// first graduate it (`1.2.3-beta.1` + patch = `1.2.3`).
#[must_use]
pub fn next_version(current: &Version, kind: ChangeKind, prerelease_id: &str) -> Version {
    let mut next = current.clone();
    next.build = BuildMetadata::EMPTY;

    match kind {
        ChangeKind::None => current.clone(),
        ChangeKind::Patch => {
            if next.pre.is_empty() {
                next.patch += 1;
            }
            next.pre = Prerelease::EMPTY;
            next
        }
        ChangeKind::Minor => {
            if next.patch != 0 || next.pre.is_empty() {
                next.minor += 1;
            }
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
            next
        }
        ChangeKind::Major => {
            if next.minor != 0 || next.patch != 0 || next.pre.is_empty() {
                next.major += 1;
            }
            next.minor = 0;
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
            next
        }
        ChangeKind::Prerelease => {
            next.pre = match increment_prerelease(&next.pre, prerelease_id) {
                Some(pre) => pre,
                None => {
                    next.patch += 1;
                    new_prerelease(prerelease_id)
                }
            };
            next
        }
    }
}

fn new_prerelease(id: &str) -> Prerelease {
    Prerelease::new(&format!("{id}.0")).unwrap_or(Prerelease::EMPTY)
}

fn increment_prerelease(pre: &Prerelease, id: &str) -> Option<Prerelease> {
    if pre.is_empty() {
        return None;
    }
    let mut parts: Vec<&str> = pre.as_str().split('.').collect();
    if parts.first() != Some(&id) {
        return Some(new_prerelease(id));
    }
    let next_number = match parts.last().and_then(|p| p.parse::<u64>().ok()) {
        Some(n) => {
            parts.pop();
            n + 1
        }
        None => 0,
    };
    let number = next_number.to_string();
    parts.push(&number);
    Prerelease::new(&parts.join(".")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().expect("valid version")
    }

    #[test]
    fn none_keeps_version() {
        assert_eq!(next_version(&v("1.2.3"), ChangeKind::None, "beta"), v("1.2.3"));
    }

    #[test]
    fn standard_increments() {
        assert_eq!(next_version(&v("1.2.3"), ChangeKind::Patch, "beta"), v("1.2.4"));
        assert_eq!(next_version(&v("1.2.3"), ChangeKind::Minor, "beta"), v("1.3.0"));
        assert_eq!(next_version(&v("1.2.3"), ChangeKind::Major, "beta"), v("2.0.0"));
    }

    #[test]
    fn stable_bump_of_prerelease_graduates_first() {
        assert_eq!(
            next_version(&v("1.2.3-beta.1"), ChangeKind::Patch, "beta"),
            v("1.2.3")
        );
        assert_eq!(
            next_version(&v("1.3.0-beta.1"), ChangeKind::Minor, "beta"),
            v("1.3.0")
        );
        assert_eq!(
            next_version(&v("2.0.0-beta.1"), ChangeKind::Major, "beta"),
            v("2.0.0")
        );
        assert_eq!(
            next_version(&v("1.2.3-beta.1"), ChangeKind::Minor, "beta"),
            v("1.3.0")
        );
    }

    #[test]
    fn prerelease_from_stable_bumps_patch_and_starts_at_zero() {
        assert_eq!(
            next_version(&v("1.0.0"), ChangeKind::Prerelease, "beta"),
            v("1.0.1-beta.0")
        );
    }

    #[test]
    fn prerelease_increments_trailing_number() {
        assert_eq!(
            next_version(&v("1.0.1-beta.0"), ChangeKind::Prerelease, "beta"),
            v("1.0.1-beta.1")
        );
        assert_eq!(
            next_version(&v("1.0.1-beta.9"), ChangeKind::Prerelease, "beta"),
            v("1.0.1-beta.10")
        );
    }

    #[test]
    fn prerelease_with_different_identifier_restarts() {
        assert_eq!(
            next_version(&v("1.0.1-alpha.4"), ChangeKind::Prerelease, "beta"),
            v("1.0.1-beta.0")
        );
    }

    #[test]
    fn prerelease_without_number_gains_one() {
        assert_eq!(
            next_version(&v("1.0.1-beta"), ChangeKind::Prerelease, "beta"),
            v("1.0.1-beta.0")
        );
    }

    #[test]
    fn build_metadata_is_dropped() {
        assert_eq!(
            next_version(&v("1.2.3+build.5"), ChangeKind::Patch, "beta"),
            v("1.2.4")
        );
    }
}
