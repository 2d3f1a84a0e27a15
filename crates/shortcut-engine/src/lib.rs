//! # shortcut-engine
//!
//! Keyboard shortcut matching and dispatch.
//!
//! ## Features
//!
//! - Platform-aware modifier normalization (Cmd on macOS, Ctrl elsewhere)
//! - Context-gated availability (modals, text input, streaming, tabs)
//! - Conflict detection against browser-reserved keys and other shortcuts
//! - Sliding-window rate limiting of incoming key events
//! - Built-in default catalog and TOML-defined catalogs

mod catalog;
mod config;
mod conflict;
mod context;
mod error;
mod event;
mod handler;
mod parser;
mod platform;
mod rate_limit;
mod shortcut;

pub use catalog::{default_catalog, Catalog, CatalogEntry};
pub use config::HandlerConfig;
pub use conflict::{Conflict, ConflictKind, ConflictReport, ConflictSeverity};
pub use context::{ContextManager, ContextUpdate, UIContext};
pub use error::{ShortcutError, ShortcutResult};
pub use event::KeyEvent;
pub use handler::KeyboardHandler;
pub use parser::parse_combination;
pub use platform::{is_modifier, normalize_combination, Platform, PlatformDetector};
pub use rate_limit::RateLimiter;
pub use shortcut::{combo, validate_combination, Shortcut, GLOBAL, INPUT_SAFE, STREAMING_SAFE};

/// Create a handler for the host platform with the default catalog registered.
pub fn with_default_catalog(config: HandlerConfig) -> ShortcutResult<KeyboardHandler> {
    let handler = KeyboardHandler::new(config)?;
    handler.register_catalog(default_catalog().into_iter().map(Ok));
    Ok(handler)
}
