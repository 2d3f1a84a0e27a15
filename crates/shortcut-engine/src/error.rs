//! Shortcut engine error types.

use thiserror::Error;

/// Errors that can occur while registering or dispatching shortcuts.
#[derive(Debug, Error)]
pub enum ShortcutError {
    /// Host platform could not be identified.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Key combination is empty or malformed.
    #[error("Invalid key combination: {0}")]
    InvalidCombination(String),

    /// Shortcut definition failed validation.
    #[error("Invalid shortcut '{id}': {reason}")]
    InvalidShortcut { id: String, reason: String },

    /// UI context snapshot failed validation.
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    /// Context update named a field that does not exist.
    #[error("Unknown context field: {0}")]
    UnknownContextField(String),

    /// Key event failed validation.
    #[error("Invalid key event: {0}")]
    InvalidEvent(String),

    /// A shortcut with this id is already registered.
    #[error("Shortcut already registered: {0}")]
    DuplicateId(String),

    /// No shortcut with this id is registered.
    #[error("Shortcut not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML error.
    #[error("TOML error: {0}")]
    Toml(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal state could not be accessed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<toml::de::Error> for ShortcutError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e.to_string())
    }
}

/// Result type for shortcut operations.
pub type ShortcutResult<T> = Result<T, ShortcutError>;
