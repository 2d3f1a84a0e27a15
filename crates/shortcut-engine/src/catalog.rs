//! Shortcut catalogs: the built-in defaults and TOML-defined sets.

use crate::error::{ShortcutError, ShortcutResult};
use crate::parser::parse_combination;
use crate::shortcut::{Shortcut, GLOBAL, INPUT_SAFE, STREAMING_SAFE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::error;

/// One catalog entry, with keys in `"ctrl+s"` notation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub keys: String,
    pub action: String,
    #[serde(default)]
    pub context: BTreeSet<String>,
    /// Platform name to override notation
    #[serde(default)]
    pub platform_overrides: BTreeMap<String, String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl CatalogEntry {
    /// Convert into a validated shortcut.
    pub fn into_shortcut(self) -> ShortcutResult<Shortcut> {
        let id = self.id.clone();
        let invalid = |e: ShortcutError| ShortcutError::InvalidShortcut {
            id: id.clone(),
            reason: e.to_string(),
        };

        let mut platform_overrides = BTreeMap::new();
        for (platform, notation) in self.platform_overrides {
            platform_overrides.insert(platform, parse_combination(&notation).map_err(invalid)?);
        }

        let shortcut = Shortcut {
            id: self.id,
            name: self.name,
            description: self.description,
            key_combination: parse_combination(&self.keys).map_err(invalid)?,
            action: self.action,
            context: self.context,
            platform_overrides,
            enabled: self.enabled,
        };
        shortcut.validate()?;
        Ok(shortcut)
    }
}

/// A list of catalog entries, as read from `[[shortcuts]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub shortcuts: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parse a catalog from TOML.
    pub fn from_toml_str(s: &str) -> ShortcutResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a catalog from a file.
    pub fn load(path: impl AsRef<Path>) -> ShortcutResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Convert every entry, keeping each entry's own result.
    pub fn into_shortcuts(self) -> Vec<ShortcutResult<Shortcut>> {
        self.shortcuts
            .into_iter()
            .map(CatalogEntry::into_shortcut)
            .collect()
    }
}

/// A built-in shortcut definition.
struct BuiltIn {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    keys: &'static str,
    action: &'static str,
    tags: &'static [&'static str],
}

impl BuiltIn {
    fn to_shortcut(&self) -> ShortcutResult<Shortcut> {
        let key_combination = parse_combination(self.keys).map_err(|e| {
            ShortcutError::InvalidShortcut {
                id: self.id.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(
            Shortcut::new(self.id, self.name, self.description, key_combination, self.action)?
                .in_contexts(self.tags.iter().copied()),
        )
    }
}

const BUILT_INS: &[BuiltIn] = &[
    BuiltIn {
        id: "save_session",
        name: "Save Session",
        description: "Save the current session",
        keys: "ctrl+s",
        action: "save_session",
        tags: &[GLOBAL],
    },
    BuiltIn {
        id: "show_help",
        name: "Keyboard Shortcuts",
        description: "Show the shortcut reference",
        keys: "ctrl+/",
        action: "show_help",
        tags: &[GLOBAL, INPUT_SAFE],
    },
    BuiltIn {
        id: "focus_input",
        name: "Focus Input",
        description: "Move focus to the message input",
        keys: "ctrl+k",
        action: "focus_input",
        tags: &[GLOBAL, STREAMING_SAFE],
    },
    BuiltIn {
        id: "stop_streaming",
        name: "Stop Streaming",
        description: "Stop the response being streamed",
        keys: "escape",
        action: "stop_streaming",
        tags: &[INPUT_SAFE, STREAMING_SAFE],
    },
    BuiltIn {
        id: "send_message",
        name: "Send Message",
        description: "Send the message being typed",
        keys: "ctrl+enter",
        action: "send_message",
        tags: &["chat", INPUT_SAFE],
    },
    BuiltIn {
        id: "clear_chat",
        name: "Clear Chat",
        description: "Clear the conversation",
        keys: "ctrl+shift+l",
        action: "clear_chat",
        tags: &["chat"],
    },
    BuiltIn {
        id: "export_session",
        name: "Export Session",
        description: "Export the session to a file",
        keys: "ctrl+e",
        action: "export_session",
        tags: &["chat", "history"],
    },
    BuiltIn {
        id: "next_tab",
        name: "Next Tab",
        description: "Switch to the next tab",
        keys: "ctrl+]",
        action: "next_tab",
        tags: &[GLOBAL],
    },
    BuiltIn {
        id: "previous_tab",
        name: "Previous Tab",
        description: "Switch to the previous tab",
        keys: "ctrl+[",
        action: "previous_tab",
        tags: &[GLOBAL],
    },
    BuiltIn {
        id: "show_costs",
        name: "Cost Analysis",
        description: "Open the cost analysis panel",
        keys: "ctrl+shift+c",
        action: "show_costs",
        tags: &["analytics", "chat"],
    },
];

/// Built-in application shortcuts.
pub fn default_catalog() -> Vec<Shortcut> {
    keep_valid(BUILT_INS.iter().map(BuiltIn::to_shortcut))
}

/// Keep valid shortcuts, logging and dropping the rest.
fn keep_valid(entries: impl IntoIterator<Item = ShortcutResult<Shortcut>>) -> Vec<Shortcut> {
    entries
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|e| error!(error = %e, "skipping built-in shortcut"))
                .ok()
        })
        .collect()
}
