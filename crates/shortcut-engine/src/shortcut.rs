//! Shortcut definitions.

use crate::error::{ShortcutError, ShortcutResult};
use crate::platform::{is_modifier, normalize_combination, Platform};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Context tag making a shortcut available everywhere.
pub const GLOBAL: &str = "global";
/// Context tag allowing a shortcut while a text input is active.
pub const INPUT_SAFE: &str = "input_safe";
/// Context tag allowing a shortcut while a response is streaming.
pub const STREAMING_SAFE: &str = "streaming_safe";

/// A bindable application action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    /// Unique registry key
    pub id: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Modifier tokens followed by one terminal key
    pub key_combination: Vec<String>,
    /// Action identifier returned on dispatch
    pub action: String,
    /// Availability tags (`global`, `input_safe`, tab names, ...)
    #[serde(default)]
    pub context: BTreeSet<String>,
    /// Explicit combinations per platform name
    #[serde(default)]
    pub platform_overrides: BTreeMap<String, Vec<String>>,
    /// Disabled shortcuts stay registered but never match
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Shortcut {
    /// Create a validated shortcut with no context tags.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        key_combination: Vec<String>,
        action: impl Into<String>,
    ) -> ShortcutResult<Self> {
        let shortcut = Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            key_combination: key_combination
                .into_iter()
                .map(|k| k.to_lowercase())
                .collect(),
            action: action.into(),
            context: BTreeSet::new(),
            platform_overrides: BTreeMap::new(),
            enabled: true,
        };
        shortcut.validate()?;
        Ok(shortcut)
    }

    /// Add a context tag.
    pub fn in_context(mut self, tag: impl Into<String>) -> Self {
        self.context.insert(tag.into());
        self
    }

    /// Add several context tags.
    pub fn in_contexts<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Use an explicit combination on one platform.
    pub fn with_platform_override(mut self, platform: &Platform, combination: Vec<String>) -> Self {
        self.platform_overrides.insert(
            platform.as_str().to_string(),
            combination.into_iter().map(|k| k.to_lowercase()).collect(),
        );
        self
    }

    /// Set whether the shortcut participates in matching.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Check if the shortcut carries a context tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.context.contains(tag)
    }

    /// Get the override combination for a platform, if any.
    pub fn platform_override(&self, platform: &Platform) -> Option<&Vec<String>> {
        self.platform_overrides
            .iter()
            .find(|(name, _)| Platform::from(name.as_str()) == *platform)
            .map(|(_, combo)| combo)
    }

    /// Resolve the combination this shortcut matches on a platform.
    ///
    /// An override is used verbatim (lower-cased); otherwise the generic
    /// combination is normalized for the platform.
    pub fn combination_for(&self, platform: &Platform) -> ShortcutResult<Vec<String>> {
        match self.platform_override(platform) {
            Some(combo) if !combo.is_empty() => {
                Ok(combo.iter().map(|k| k.trim().to_lowercase()).collect())
            }
            Some(_) => Err(ShortcutError::InvalidCombination(format!(
                "empty override for platform '{}'",
                platform
            ))),
            None => normalize_combination(&self.key_combination, platform),
        }
    }

    /// Validate the shortcut's invariants.
    pub fn validate(&self) -> ShortcutResult<()> {
        let invalid = |reason: String| ShortcutError::InvalidShortcut {
            id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id is empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(invalid("description is empty".to_string()));
        }
        if self.action.trim().is_empty() {
            return Err(invalid("action is empty".to_string()));
        }

        validate_combination(&self.key_combination).map_err(|e| invalid(e.to_string()))?;
        let mut seen = HashSet::new();
        for (platform, combo) in &self.platform_overrides {
            validate_combination(combo)
                .map_err(|e| invalid(format!("override for '{}': {}", platform, e)))?;
            if !seen.insert(Platform::from(platform.as_str())) {
                return Err(invalid(format!(
                    "more than one override for platform '{}'",
                    Platform::from(platform.as_str())
                )));
            }
        }

        if self.context.iter().any(|tag| tag.trim().is_empty()) {
            return Err(invalid("context tag is empty".to_string()));
        }

        Ok(())
    }
}

/// Validate a combination's shape: modifiers followed by exactly one key.
pub fn validate_combination(combination: &[String]) -> ShortcutResult<()> {
    let Some((terminal, modifiers)) = combination.split_last() else {
        return Err(ShortcutError::InvalidCombination(
            "key combination is empty".to_string(),
        ));
    };

    if combination.iter().any(|k| k.trim().is_empty()) {
        return Err(ShortcutError::InvalidCombination(
            "key combination contains an empty key".to_string(),
        ));
    }
    if is_modifier(terminal) {
        return Err(ShortcutError::InvalidCombination(format!(
            "'{}' is a modifier, not a terminal key",
            terminal
        )));
    }
    if let Some(key) = modifiers.iter().find(|k| !is_modifier(k)) {
        return Err(ShortcutError::InvalidCombination(format!(
            "more than one terminal key ('{}' and '{}')",
            key, terminal
        )));
    }

    Ok(())
}

/// Build a combination from string slices.
pub fn combo(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save() -> Shortcut {
        Shortcut::new("save", "Save", "Save the session", combo(&["Ctrl", "S"]), "save_document")
            .unwrap()
            .in_context(GLOBAL)
    }

    #[test]
    fn test_new_lowercases_combination() {
        let shortcut = save();
        assert_eq!(shortcut.key_combination, vec!["ctrl", "s"]);
        assert!(shortcut.enabled);
        assert!(shortcut.has_tag(GLOBAL));
    }

    #[test]
    fn test_new_rejects_empty_fields() {
        let err = Shortcut::new("", "Save", "Save", combo(&["ctrl", "s"]), "save").unwrap_err();
        assert!(matches!(err, ShortcutError::InvalidShortcut { .. }));

        let err = Shortcut::new("save", "Save", "Save", combo(&["ctrl", "s"]), " ").unwrap_err();
        assert!(err.to_string().contains("action is empty"));

        let err = Shortcut::new("save", "Save", "Save", Vec::new(), "save").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_combination_shape() {
        assert!(validate_combination(&combo(&["ctrl", "shift", "s"])).is_ok());
        assert!(validate_combination(&combo(&["escape"])).is_ok());
        assert!(validate_combination(&combo(&["ctrl"])).is_err());
        assert!(validate_combination(&combo(&["a", "b"])).is_err());
        assert!(validate_combination(&combo(&["ctrl", ""])).is_err());
    }

    #[test]
    fn test_combination_for_platform() {
        let shortcut = save();
        assert_eq!(shortcut.combination_for(&Platform::Mac).unwrap(), vec!["meta", "s"]);
        assert_eq!(
            shortcut.combination_for(&Platform::Windows).unwrap(),
            vec!["ctrl", "s"]
        );
    }

    #[test]
    fn test_platform_override() {
        let shortcut =
            save().with_platform_override(&Platform::Mac, combo(&["Meta", "Shift", "S"]));

        assert_eq!(
            shortcut.combination_for(&Platform::Mac).unwrap(),
            vec!["meta", "shift", "s"]
        );
        assert_eq!(shortcut.combination_for(&Platform::Linux).unwrap(), vec!["ctrl", "s"]);
    }

    #[test]
    fn test_override_key_aliases() {
        let mut shortcut = save();
        shortcut
            .platform_overrides
            .insert("macos".to_string(), combo(&["meta", "k"]));
        assert_eq!(shortcut.combination_for(&Platform::Mac).unwrap(), vec!["meta", "k"]);
    }

    #[test]
    fn test_aliased_override_keys_rejected() {
        let mut shortcut = save().with_platform_override(&Platform::Mac, combo(&["meta", "s"]));
        shortcut
            .platform_overrides
            .insert("macos".to_string(), combo(&["meta", "k"]));

        let err = shortcut.validate().unwrap_err();
        assert!(matches!(err, ShortcutError::InvalidShortcut { .. }));
        assert!(err.to_string().contains("more than one override"));
    }

    #[test]
    fn test_validate_override() {
        let shortcut = save().with_platform_override(&Platform::Windows, combo(&["ctrl"]));
        let err = shortcut.validate().unwrap_err();
        assert!(err.to_string().contains("override for 'windows'"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let shortcut: Shortcut = toml::from_str(
            r#"
            id = "help"
            name = "Help"
            description = "Show help"
            key_combination = ["f1"]
            action = "show_help"
            "#,
        )
        .unwrap();

        assert!(shortcut.enabled);
        assert!(shortcut.context.is_empty());
        assert!(shortcut.validate().is_ok());
    }
}
