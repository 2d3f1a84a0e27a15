//! UI context snapshots and shortcut availability.

use crate::error::{ShortcutError, ShortcutResult};
use crate::shortcut::{Shortcut, GLOBAL, INPUT_SAFE, STREAMING_SAFE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, error, warn};

/// Snapshot of the UI state that gates shortcut availability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UIContext {
    /// Name of the active tab, empty when none
    #[serde(default)]
    pub active_tab: String,
    /// Identifier of the focused element
    #[serde(default)]
    pub focused_element: Option<String>,
    /// A modal dialog is open
    #[serde(default)]
    pub modal_open: bool,
    /// A text input has focus
    #[serde(default)]
    pub input_active: bool,
    /// A response is streaming
    #[serde(default)]
    pub streaming_active: bool,
    /// Allow-list of dispatchable actions, unrestricted when unset
    #[serde(default)]
    pub available_actions: Option<BTreeSet<String>>,
}

impl UIContext {
    /// Create a default context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active tab.
    pub fn with_tab(mut self, tab: impl Into<String>) -> Self {
        self.active_tab = tab.into();
        self
    }

    /// Validate the snapshot.
    pub fn validate(&self) -> ShortcutResult<()> {
        if let Some(ref focused) = self.focused_element {
            if focused.trim().is_empty() {
                return Err(ShortcutError::InvalidContext(
                    "focused element is empty".to_string(),
                ));
            }
        }
        if let Some(ref actions) = self.available_actions {
            if actions.iter().any(|a| a.trim().is_empty()) {
                return Err(ShortcutError::InvalidContext(
                    "available actions contain an empty action".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A single field update for a [`UIContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextUpdate {
    ActiveTab(String),
    FocusedElement(Option<String>),
    ModalOpen(bool),
    InputActive(bool),
    StreamingActive(bool),
    AvailableActions(Option<BTreeSet<String>>),
}

impl ContextUpdate {
    /// Names of all updatable fields.
    pub const FIELDS: [&'static str; 6] = [
        "active_tab",
        "focused_element",
        "modal_open",
        "input_active",
        "streaming_active",
        "available_actions",
    ];

    /// Parse a named field update.
    ///
    /// `focused_element = ""` clears the focus and `available_actions = false`
    /// removes the allow-list.
    pub fn from_field(name: &str, value: &toml::Value) -> ShortcutResult<Self> {
        let mismatch = |expected: &str| {
            ShortcutError::InvalidContext(format!(
                "field '{}' expects {}, got {}",
                name,
                expected,
                value.type_str()
            ))
        };

        match name {
            "active_tab" => value
                .as_str()
                .map(|s| Self::ActiveTab(s.to_string()))
                .ok_or_else(|| mismatch("a string")),
            "focused_element" => value
                .as_str()
                .map(|s| Self::FocusedElement((!s.is_empty()).then(|| s.to_string())))
                .ok_or_else(|| mismatch("a string")),
            "modal_open" => value
                .as_bool()
                .map(Self::ModalOpen)
                .ok_or_else(|| mismatch("a boolean")),
            "input_active" => value
                .as_bool()
                .map(Self::InputActive)
                .ok_or_else(|| mismatch("a boolean")),
            "streaming_active" => value
                .as_bool()
                .map(Self::StreamingActive)
                .ok_or_else(|| mismatch("a boolean")),
            "available_actions" => match value {
                toml::Value::Boolean(false) => Ok(Self::AvailableActions(None)),
                toml::Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<BTreeSet<_>>>()
                    .map(|actions| Self::AvailableActions(Some(actions)))
                    .ok_or_else(|| mismatch("an array of strings")),
                _ => Err(mismatch("an array of strings or false")),
            },
            other => Err(ShortcutError::UnknownContextField(other.to_string())),
        }
    }

    /// Name of the field this update targets.
    pub fn field(&self) -> &'static str {
        match self {
            Self::ActiveTab(_) => "active_tab",
            Self::FocusedElement(_) => "focused_element",
            Self::ModalOpen(_) => "modal_open",
            Self::InputActive(_) => "input_active",
            Self::StreamingActive(_) => "streaming_active",
            Self::AvailableActions(_) => "available_actions",
        }
    }

    /// Apply this update to a context.
    pub fn apply(self, context: &mut UIContext) -> ShortcutResult<()> {
        match self {
            Self::ActiveTab(tab) => context.active_tab = tab,
            Self::FocusedElement(Some(ref focused)) if focused.trim().is_empty() => {
                return Err(ShortcutError::InvalidContext(
                    "focused element is empty".to_string(),
                ));
            }
            Self::FocusedElement(focused) => context.focused_element = focused,
            Self::ModalOpen(open) => context.modal_open = open,
            Self::InputActive(active) => context.input_active = active,
            Self::StreamingActive(active) => context.streaming_active = active,
            Self::AvailableActions(Some(ref actions))
                if actions.iter().any(|a| a.trim().is_empty()) =>
            {
                return Err(ShortcutError::InvalidContext(
                    "available actions contain an empty action".to_string(),
                ));
            }
            Self::AvailableActions(actions) => context.available_actions = actions,
        }
        Ok(())
    }
}

/// Owns the live UI context and decides shortcut availability.
#[derive(Debug, Default)]
pub struct ContextManager {
    current: RwLock<UIContext>,
}

impl ContextManager {
    /// Create a manager with a default context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager starting from a given context.
    pub fn with_context(context: UIContext) -> Self {
        Self {
            current: RwLock::new(context),
        }
    }

    /// Get a snapshot of the current context.
    pub fn get_current_context(&self) -> UIContext {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Restore the default context.
    pub fn reset(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = UIContext::default();
    }

    /// Apply typed field updates.
    ///
    /// An update that fails is logged and skipped. Returns how many were applied.
    pub fn update_context(&self, updates: impl IntoIterator<Item = ContextUpdate>) -> usize {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut applied = 0;

        for update in updates {
            let field = update.field();
            match update.apply(&mut current) {
                Ok(()) => applied += 1,
                Err(e) => error!(field, error = %e, "failed to apply context update"),
            }
        }

        debug!(applied, "context updated");
        applied
    }

    /// Apply string-keyed field updates.
    ///
    /// Unknown field names are warned about and ignored; values of the wrong
    /// type are logged and skipped. Returns how many fields were applied.
    pub fn update_fields(&self, fields: &toml::Table) -> usize {
        let updates: Vec<ContextUpdate> = fields
            .iter()
            .filter_map(|(name, value)| match ContextUpdate::from_field(name, value) {
                Ok(update) => Some(update),
                Err(ShortcutError::UnknownContextField(field)) => {
                    warn!(field = %field, "ignoring unknown context field");
                    None
                }
                Err(e) => {
                    error!(field = %name, error = %e, "skipping invalid context field");
                    None
                }
            })
            .collect();

        self.update_context(updates)
    }

    /// Check whether a shortcut may fire in a context.
    ///
    /// Rules are evaluated in order and the first that applies decides.
    /// An invalid context is never available.
    pub fn is_shortcut_available(&self, shortcut: &Shortcut, context: &UIContext) -> bool {
        if let Err(e) = context.validate() {
            error!(shortcut_id = %shortcut.id, error = %e, "availability check failed");
            return false;
        }

        if context.modal_open {
            return false;
        }
        if context.input_active && !shortcut.has_tag(INPUT_SAFE) {
            return false;
        }
        if context.streaming_active && !shortcut.has_tag(STREAMING_SAFE) {
            return false;
        }
        if let Some(ref allowed) = context.available_actions {
            if !allowed.contains(&shortcut.action) {
                return false;
            }
        }

        if shortcut.has_tag(GLOBAL) {
            return true;
        }
        if !context.active_tab.is_empty() && shortcut.has_tag(&context.active_tab) {
            return true;
        }
        if shortcut.context.is_empty() {
            return true;
        }

        shortcut.has_tag(INPUT_SAFE) || shortcut.has_tag(STREAMING_SAFE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::combo;
    use proptest::prelude::*;

    fn shortcut(tags: &[&str]) -> Shortcut {
        Shortcut::new("export", "Export", "Export the chat", combo(&["ctrl", "e"]), "export_chat")
            .unwrap()
            .in_contexts(tags.iter().copied())
    }

    #[test]
    fn test_modal_blocks_everything() {
        let manager = ContextManager::new();
        let context = UIContext {
            modal_open: true,
            ..UIContext::default()
        };

        assert!(!manager.is_shortcut_available(&shortcut(&[GLOBAL]), &context));
        assert!(!manager.is_shortcut_available(&shortcut(&[]), &context));
    }

    #[test]
    fn test_input_and_streaming_gates() {
        let manager = ContextManager::new();
        let typing = UIContext {
            input_active: true,
            ..UIContext::default()
        };
        assert!(!manager.is_shortcut_available(&shortcut(&[GLOBAL]), &typing));
        assert!(manager.is_shortcut_available(&shortcut(&[GLOBAL, INPUT_SAFE]), &typing));

        let streaming = UIContext {
            streaming_active: true,
            ..UIContext::default()
        };
        assert!(!manager.is_shortcut_available(&shortcut(&[INPUT_SAFE]), &streaming));
        assert!(manager.is_shortcut_available(&shortcut(&[STREAMING_SAFE]), &streaming));
    }

    #[test]
    fn test_available_actions_allow_list() {
        let manager = ContextManager::new();
        let mut context = UIContext::default();
        context.available_actions = Some(BTreeSet::from(["save_document".to_string()]));

        assert!(!manager.is_shortcut_available(&shortcut(&[GLOBAL]), &context));

        context
            .available_actions
            .as_mut()
            .unwrap()
            .insert("export_chat".to_string());
        assert!(manager.is_shortcut_available(&shortcut(&[GLOBAL]), &context));
    }

    #[test]
    fn test_tab_tags() {
        let manager = ContextManager::new();
        let chat = UIContext::new().with_tab("chat");
        let history = UIContext::new().with_tab("history");

        assert!(manager.is_shortcut_available(&shortcut(&["chat"]), &chat));
        assert!(!manager.is_shortcut_available(&shortcut(&["chat"]), &history));
        assert!(!manager.is_shortcut_available(&shortcut(&["chat"]), &UIContext::new()));
    }

    #[test]
    fn test_untagged_and_safe_tags_available() {
        let manager = ContextManager::new();
        let context = UIContext::new().with_tab("settings");

        assert!(manager.is_shortcut_available(&shortcut(&[]), &context));
        assert!(manager.is_shortcut_available(&shortcut(&[INPUT_SAFE]), &context));
        assert!(manager.is_shortcut_available(&shortcut(&["chat", STREAMING_SAFE]), &context));
    }

    #[test]
    fn test_invalid_context_fails_closed() {
        let manager = ContextManager::new();
        let context = UIContext {
            focused_element: Some(String::new()),
            ..UIContext::default()
        };
        assert!(!manager.is_shortcut_available(&shortcut(&[GLOBAL]), &context));
    }

    #[test]
    fn test_update_context() {
        let manager = ContextManager::new();
        let applied = manager.update_context([
            ContextUpdate::ActiveTab("history".to_string()),
            ContextUpdate::ModalOpen(true),
            ContextUpdate::FocusedElement(Some("  ".to_string())),
        ]);
        assert_eq!(applied, 2);

        let current = manager.get_current_context();
        assert_eq!(current.active_tab, "history");
        assert!(current.modal_open);
        assert_eq!(current.focused_element, None);

        manager.reset();
        assert_eq!(manager.get_current_context(), UIContext::default());
    }

    #[test]
    fn test_update_fields() {
        let manager = ContextManager::new();
        let fields: toml::Table = toml::from_str(
            r#"
            active_tab = "chat"
            streaming_active = true
            available_actions = ["stop_streaming"]
            colour = "blue"
            input_active = "yes"
            "#,
        )
        .unwrap();

        assert_eq!(manager.update_fields(&fields), 3);

        let current = manager.get_current_context();
        assert_eq!(current.active_tab, "chat");
        assert!(current.streaming_active);
        assert!(!current.input_active);
        assert_eq!(
            current.available_actions,
            Some(BTreeSet::from(["stop_streaming".to_string()]))
        );
    }

    #[test]
    fn test_from_field_errors() {
        let err = ContextUpdate::from_field("colour", &toml::Value::Boolean(true)).unwrap_err();
        assert!(matches!(err, ShortcutError::UnknownContextField(_)));

        let err = ContextUpdate::from_field("modal_open", &toml::Value::Integer(1)).unwrap_err();
        assert!(matches!(err, ShortcutError::InvalidContext(_)));

        let update =
            ContextUpdate::from_field("available_actions", &toml::Value::Boolean(false)).unwrap();
        assert_eq!(update, ContextUpdate::AvailableActions(None));

        for field in ContextUpdate::FIELDS {
            let err = ContextUpdate::from_field(field, &toml::Value::Float(1.5)).unwrap_err();
            assert!(matches!(err, ShortcutError::InvalidContext(_)));
        }
    }

    proptest! {
        #[test]
        fn prop_modal_always_unavailable(
            tags in prop::collection::btree_set("[a-z_]{1,12}", 0..5),
            tab in "[a-z]{0,8}",
            input_active: bool,
            streaming_active: bool,
        ) {
            let manager = ContextManager::new();
            let mut shortcut = shortcut(&[GLOBAL, INPUT_SAFE, STREAMING_SAFE]);
            shortcut.context.extend(tags);
            let context = UIContext {
                active_tab: tab,
                modal_open: true,
                input_active,
                streaming_active,
                ..UIContext::default()
            };

            prop_assert!(!manager.is_shortcut_available(&shortcut, &context));
        }
    }
}
