//! Handler configuration.

use crate::error::{ShortcutError, ShortcutResult};
use crate::parser::parse_combination;
use crate::platform::{normalize_combination, Platform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Tunables for a [`crate::KeyboardHandler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Rate-limit window in seconds.
    #[serde(default = "default_window")]
    pub rate_limit_window_secs: f64,
    /// Events accepted per window.
    #[serde(default = "default_max_events")]
    pub max_events_per_second: usize,
    /// Browser-reserved combinations per platform name, in `"ctrl+t"` notation.
    #[serde(default = "default_reserved")]
    pub reserved: BTreeMap<String, Vec<String>>,
}

fn default_window() -> f64 {
    1.0
}

fn default_max_events() -> usize {
    10
}

fn default_reserved() -> BTreeMap<String, Vec<String>> {
    let pc = [
        "ctrl+t",
        "ctrl+w",
        "ctrl+n",
        "ctrl+shift+n",
        "ctrl+shift+t",
        "ctrl+tab",
        "ctrl+shift+tab",
        "ctrl+l",
        "ctrl+r",
        "ctrl+h",
        "ctrl+j",
        "ctrl+d",
        "ctrl+p",
        "f5",
        "f11",
        "f12",
        "alt+f4",
    ];
    let mac = [
        "meta+t",
        "meta+w",
        "meta+n",
        "meta+q",
        "meta+shift+n",
        "meta+shift+t",
        "meta+l",
        "meta+r",
        "meta+d",
        "meta+p",
        "meta+y",
        "meta+option+i",
    ];

    let to_vec = |keys: &[&str]| keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        ("mac".to_string(), to_vec(&mac)),
        ("windows".to_string(), to_vec(&pc)),
        ("linux".to_string(), to_vec(&pc)),
    ])
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            rate_limit_window_secs: default_window(),
            max_events_per_second: default_max_events(),
            reserved: default_reserved(),
        }
    }
}

impl HandlerConfig {
    /// Parse configuration from TOML.
    pub fn from_toml_str(s: &str) -> ShortcutResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> ShortcutResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check that the tunables are usable.
    pub fn validate(&self) -> ShortcutResult<()> {
        self.rate_limit_window()?;
        if self.max_events_per_second == 0 {
            return Err(ShortcutError::Config(
                "max_events_per_second must be at least 1".to_string(),
            ));
        }
        for (platform, combos) in &self.reserved {
            for notation in combos {
                parse_combination(notation).map_err(|e| {
                    ShortcutError::Config(format!("reserved key for '{}': {}", platform, e))
                })?;
            }
        }
        Ok(())
    }

    /// Rate-limit window as a duration.
    pub fn rate_limit_window(&self) -> ShortcutResult<Duration> {
        match Duration::try_from_secs_f64(self.rate_limit_window_secs) {
            Ok(window) if !window.is_zero() => Ok(window),
            _ => Err(ShortcutError::Config(format!(
                "rate_limit_window_secs must be a positive number, got {}",
                self.rate_limit_window_secs
            ))),
        }
    }

    /// Browser-reserved combinations for a platform, normalized for it.
    ///
    /// Entries that fail to parse are skipped.
    pub fn reserved_for(&self, platform: &Platform) -> Vec<Vec<String>> {
        self.reserved
            .iter()
            .filter(|(name, _)| Platform::from(name.as_str()) == *platform)
            .flat_map(|(_, combos)| combos.iter())
            .filter_map(|notation| parse_combination(notation).ok())
            .filter_map(|combo| normalize_combination(&combo, platform).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::combo;

    #[test]
    fn test_defaults() {
        let config = HandlerConfig::default();
        assert_eq!(config.max_events_per_second, 10);
        assert_eq!(config.rate_limit_window().unwrap(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reserved_normalized() {
        let config = HandlerConfig::default();

        let windows = config.reserved_for(&Platform::Windows);
        assert!(windows.contains(&combo(&["ctrl", "t"])));

        let mac = config.reserved_for(&Platform::Mac);
        assert!(mac.contains(&combo(&["meta", "t"])));
        assert!(mac.contains(&combo(&["meta", "option", "i"])));

        assert!(config.reserved_for(&Platform::from("haiku")).is_empty());
    }

    #[test]
    fn test_from_toml() {
        let config = HandlerConfig::from_toml_str(
            r#"
            rate_limit_window_secs = 0.5
            max_events_per_second = 3

            [reserved]
            linux = ["ctrl+q"]
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit_window().unwrap(), Duration::from_millis(500));
        assert_eq!(config.max_events_per_second, 3);
        assert_eq!(config.reserved_for(&Platform::Linux), vec![combo(&["ctrl", "q"])]);
        assert!(config.reserved_for(&Platform::Windows).is_empty());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = HandlerConfig::from_toml_str("max_events_per_second = 20").unwrap();
        assert_eq!(config.rate_limit_window_secs, 1.0);
        assert!(!config.reserved_for(&Platform::Mac).is_empty());
    }

    #[test]
    fn test_invalid_config() {
        assert!(HandlerConfig::from_toml_str("rate_limit_window_secs = 0.0").is_err());
        assert!(HandlerConfig::from_toml_str("rate_limit_window_secs = -1.0").is_err());
        assert!(HandlerConfig::from_toml_str("max_events_per_second = 0").is_err());
        assert!(HandlerConfig::from_toml_str("[reserved]\nmac = [\"\"]").is_err());
        assert!(matches!(
            HandlerConfig::from_toml_str("max_events_per_second = \"ten\""),
            Err(ShortcutError::Toml(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = HandlerConfig::load("/nonexistent/shortcuts.toml").unwrap_err();
        assert!(matches!(err, ShortcutError::Io(_)));
    }
}
