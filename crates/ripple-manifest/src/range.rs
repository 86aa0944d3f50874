use semver::Version;

/// Rewrites a dependency range for a newly computed version, preserving the
/// range's operator.
///
/// Returns `None` for specifiers the rewriter does not follow: local paths
/// (`file:`, `link:`, `portal:`), shared-catalog references (`catalog:`),
/// wildcard ranges, and `workspace:` aliases without a pinned number. Those
/// entries are left untouched in the manifest, which also leaves them out of
/// changelog attribution.
#[must_use]
pub fn bump_range(range: &str, new_version: &Version) -> Option<String> {
    let range = range.trim();

    if let Some(rest) = range.strip_prefix("workspace:") {
        // workspace aliases without a pinned number stay as-is
        if matches!(rest, "" | "*" | "^" | "~") {
            return None;
        }
        return bump_range(rest, new_version).map(|r| format!("workspace:{r}"));
    }

    if range.is_empty() || range == "*" {
        return None;
    }

    if let Some(op) = range.chars().next().filter(|c| *c == '^' || *c == '~') {
        return Some(format!("{op}{new_version}"));
    }

    if range.contains(">=") {
        return Some(format!(
            ">={new_version} <{}.0.0",
            new_version.major + 1
        ));
    }

    if range.contains(" - ") {
        return Some(format!(
            "{new_version} - {}.0.0",
            new_version.major + 1
        ));
    }

    // Exact pins move to the exact new version; anything else is opaque.
    if range.parse::<Version>().is_ok() {
        return Some(new_version.to_string());
    }

    None
}
