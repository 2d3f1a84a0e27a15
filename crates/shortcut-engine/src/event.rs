//! Key events.

use crate::context::UIContext;
use crate::error::{ShortcutError, ShortcutResult};
use crate::platform::Platform;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::Instant;

/// One raw key press, captured with the UI state at the time it happened.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// Terminal key name (`"s"`, `"enter"`, `"f5"`)
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
    /// Originating platform, the handler's platform when unset
    pub platform: Option<Platform>,
    /// UI context at event time
    pub context: UIContext,
    /// Wall-clock time, for logging
    pub timestamp: DateTime<Utc>,
    /// Monotonic time, for rate limiting
    pub monotonic: Instant,
}

impl KeyEvent {
    /// Create a validated event with no modifiers, stamped now.
    pub fn new(key: impl Into<String>, context: UIContext) -> ShortcutResult<Self> {
        let event = Self {
            key: key.into(),
            ctrl: false,
            meta: false,
            alt: false,
            shift: false,
            platform: None,
            context,
            timestamp: Utc::now(),
            monotonic: Instant::now(),
        };
        event.validate()?;
        Ok(event)
    }

    /// Convert a crossterm key event.
    pub fn from_crossterm(
        event: &crossterm::event::KeyEvent,
        context: UIContext,
    ) -> ShortcutResult<Self> {
        let key = key_name(event.code).ok_or_else(|| {
            ShortcutError::InvalidEvent(format!("unsupported key code: {:?}", event.code))
        })?;

        let mut converted = Self::new(key, context)?;
        converted.ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        converted.meta = event
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META);
        converted.alt = event.modifiers.contains(KeyModifiers::ALT);
        converted.shift = event.modifiers.contains(KeyModifiers::SHIFT);
        Ok(converted)
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Set the originating platform.
    pub fn on_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set the monotonic timestamp.
    pub fn at(mut self, monotonic: Instant) -> Self {
        self.monotonic = monotonic;
        self
    }

    /// Validate the event.
    pub fn validate(&self) -> ShortcutResult<()> {
        if self.key.trim().is_empty() {
            return Err(ShortcutError::InvalidEvent("key is empty".to_string()));
        }
        self.context
            .validate()
            .map_err(|e| ShortcutError::InvalidEvent(e.to_string()))
    }

    /// Canonical combination: `[ctrl?, meta?, alt?, shift?, key]`.
    ///
    /// Modifier order is fixed regardless of which are pressed.
    pub fn combination(&self) -> Vec<String> {
        let mut combo = Vec::with_capacity(5);
        if self.ctrl {
            combo.push("ctrl".to_string());
        }
        if self.meta {
            combo.push("meta".to_string());
        }
        if self.alt {
            combo.push("alt".to_string());
        }
        if self.shift {
            combo.push("shift".to_string());
        }
        combo.push(self.key.trim().to_lowercase());
        combo
    }
}

/// Name a crossterm key code the way combinations spell it.
fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Tab | KeyCode::BackTab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::F(n) => format!("f{}", n),
        _ => return None,
    };
    Some(name)
}
