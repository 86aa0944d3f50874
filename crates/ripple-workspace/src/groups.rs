use ripple_core::ChangeKind;
use serde::Deserialize;

/// Authored definition of a version group: packages matching the patterns are
/// forced to share the same computed version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    pub name: String,
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub disallowed_change_types: Vec<ChangeKind>,
}

/// A group with its membership resolved against the actual workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGroup {
    pub name: String,
    pub disallowed: Vec<ChangeKind>,
    /// Package names, in workspace resolution order. Computed, never authored.
    pub members: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_config_deserializes_with_defaults() {
        let json = r#"{ "name": "platform", "include": ["packages/platform/*"] }"#;
        let config: GroupConfig = serde_json::from_str(json).expect("valid config");
        assert_eq!(config.name, "platform");
        assert!(config.exclude.is_empty());
        assert!(config.disallowed_change_types.is_empty());
    }
}
