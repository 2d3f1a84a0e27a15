//! Shortcut registry and event dispatch.

use crate::config::HandlerConfig;
use crate::conflict::{Conflict, ConflictReport};
use crate::context::{ContextManager, UIContext};
use crate::error::{ShortcutError, ShortcutResult};
use crate::event::KeyEvent;
use crate::platform::{normalize_combination, Platform, PlatformDetector};
use crate::rate_limit::RateLimiter;
use crate::shortcut::Shortcut;

use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Registry and rate-limit window, guarded together.
#[derive(Debug)]
struct HandlerState {
    /// Registered shortcuts in insertion order, which is match order
    shortcuts: Vec<Shortcut>,
    limiter: RateLimiter,
}

impl HandlerState {
    fn position(&self, id: &str) -> Option<usize> {
        self.shortcuts.iter().position(|s| s.id == id)
    }
}

/// Resolves key events to application actions.
///
/// All operations take `&self`; the handler can be shared across threads.
#[derive(Debug)]
pub struct KeyboardHandler {
    platform: Platform,
    config: HandlerConfig,
    reserved: Vec<Vec<String>>,
    contexts: ContextManager,
    state: Mutex<HandlerState>,
}

impl KeyboardHandler {
    /// Create a handler for the host platform.
    pub fn new(config: HandlerConfig) -> ShortcutResult<Self> {
        let platform = PlatformDetector::new().get_platform()?;
        Self::with_platform(platform, config)
    }

    /// Create a handler for an explicit platform.
    pub fn with_platform(platform: Platform, config: HandlerConfig) -> ShortcutResult<Self> {
        config.validate().inspect_err(|e| {
            error!(error = %e, "invalid handler configuration");
        })?;

        let limiter = RateLimiter::new(config.rate_limit_window()?, config.max_events_per_second);
        let reserved = config.reserved_for(&platform);
        info!(platform = %platform, "keyboard handler initialized");

        Ok(Self {
            platform,
            config,
            reserved,
            contexts: ContextManager::new(),
            state: Mutex::new(HandlerState {
                shortcuts: Vec::new(),
                limiter,
            }),
        })
    }

    /// Platform shortcuts are normalized for.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Active configuration.
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Owner of the live UI context.
    pub fn context_manager(&self) -> &ContextManager {
        &self.contexts
    }

    fn lock(&self) -> ShortcutResult<MutexGuard<'_, HandlerState>> {
        self.state
            .lock()
            .map_err(|_| ShortcutError::Internal("handler state lock poisoned".to_string()))
    }

    /// Register a shortcut.
    ///
    /// The stored shortcut's combination is replaced by its normalized form
    /// for this platform. Conflicts are logged but do not prevent registration.
    pub fn register_shortcut(&self, mut shortcut: Shortcut) -> ShortcutResult<()> {
        shortcut.validate().inspect_err(|e| {
            error!(shortcut_id = %shortcut.id, error = %e, "rejected invalid shortcut");
        })?;

        let mut state = self.lock()?;

        if state.position(&shortcut.id).is_some() {
            warn!(shortcut_id = %shortcut.id, "shortcut id already registered");
            return Err(ShortcutError::DuplicateId(shortcut.id));
        }

        let report = self.conflicts_in(&state.shortcuts, &shortcut);
        for conflict in &report.conflicts {
            warn!(shortcut_id = %shortcut.id, conflict = %conflict, "shortcut conflict");
        }

        let normalized = shortcut.combination_for(&self.platform).map_err(|e| {
            let err = ShortcutError::InvalidShortcut {
                id: shortcut.id.clone(),
                reason: e.to_string(),
            };
            error!(error = %err, "failed to normalize shortcut");
            err
        })?;
        shortcut.key_combination = normalized;

        shortcut.validate().map_err(|e| {
            let err = match e {
                invalid @ ShortcutError::InvalidShortcut { .. } => invalid,
                other => ShortcutError::InvalidShortcut {
                    id: shortcut.id.clone(),
                    reason: other.to_string(),
                },
            };
            error!(error = %err, "shortcut invalid after normalization");
            err
        })?;

        debug!(
            shortcut_id = %shortcut.id,
            combination = %shortcut.key_combination.join("+"),
            "registered shortcut"
        );
        state.shortcuts.push(shortcut);
        Ok(())
    }

    /// Register every shortcut from a catalog.
    ///
    /// Invalid or duplicate entries are logged and skipped. Returns how many
    /// were registered.
    pub fn register_catalog<I>(&self, catalog: I) -> usize
    where
        I: IntoIterator<Item = ShortcutResult<Shortcut>>,
    {
        let mut registered = 0;
        for entry in catalog {
            match entry.and_then(|shortcut| self.register_shortcut(shortcut)) {
                Ok(()) => registered += 1,
                Err(e) => error!(error = %e, "skipping catalog entry"),
            }
        }
        info!(registered, "catalog registered");
        registered
    }

    /// Remove a shortcut, returning it.
    pub fn unregister_shortcut(&self, id: &str) -> ShortcutResult<Shortcut> {
        let mut state = self.lock()?;
        let index = state
            .position(id)
            .ok_or_else(|| ShortcutError::NotFound(id.to_string()))?;

        debug!(shortcut_id = %id, "unregistered shortcut");
        Ok(state.shortcuts.remove(index))
    }

    /// Enable or disable a registered shortcut.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> ShortcutResult<()> {
        let mut state = self.lock()?;
        let index = state
            .position(id)
            .ok_or_else(|| ShortcutError::NotFound(id.to_string()))?;

        state.shortcuts[index].enabled = enabled;
        Ok(())
    }

    /// Get a registered shortcut by id.
    pub fn get_shortcut(&self, id: &str) -> Option<Shortcut> {
        let state = self.lock().ok()?;
        state.shortcuts.iter().find(|s| s.id == id).cloned()
    }

    /// All registered shortcuts, in registration order.
    pub fn shortcuts(&self) -> Vec<Shortcut> {
        self.lock()
            .map(|state| state.shortcuts.clone())
            .unwrap_or_default()
    }

    /// Registered shortcuts bound to an action.
    pub fn shortcuts_for_action(&self, action: &str) -> Vec<Shortcut> {
        self.lock()
            .map(|state| {
                state
                    .shortcuts
                    .iter()
                    .filter(|s| s.action == action)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of registered shortcuts.
    pub fn len(&self) -> usize {
        self.lock().map(|state| state.shortcuts.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a key event to an action.
    ///
    /// Returns `Ok(None)` when the event is rate limited, matches nothing, or
    /// matches only shortcuts unavailable in the event's context. Only an
    /// invalid event is an error.
    pub fn process_event(&self, event: &KeyEvent) -> ShortcutResult<Option<String>> {
        if let Err(e) = event.validate() {
            error!(key = %event.key, error = %e, "rejected invalid key event");
            return Err(e);
        }

        match self.dispatch(event) {
            Ok(action) => Ok(action),
            Err(e) => {
                error!(key = %event.key, error = %e, "key event dispatch failed");
                Ok(None)
            }
        }
    }

    fn dispatch(&self, event: &KeyEvent) -> ShortcutResult<Option<String>> {
        let mut state = self.lock()?;

        if !state.limiter.check(event.monotonic) {
            warn!(key = %event.key, "key event rate limited");
            return Ok(None);
        }

        let platform = event.platform.as_ref().unwrap_or(&self.platform);
        let combination = normalize_combination(&event.combination(), platform)?;

        for shortcut in state.shortcuts.iter().filter(|s| s.enabled) {
            if shortcut.combination_for(platform)? != combination {
                continue;
            }

            if self.contexts.is_shortcut_available(shortcut, &event.context) {
                info!(
                    shortcut_id = %shortcut.id,
                    action = %shortcut.action,
                    at = %event.timestamp,
                    "dispatching shortcut"
                );
                return Ok(Some(shortcut.action.clone()));
            }

            debug!(shortcut_id = %shortcut.id, "shortcut unavailable in context");
        }

        warn!(
            combination = %combination.join("+"),
            platform = %platform,
            "no shortcut matched"
        );
        Ok(None)
    }

    /// Enabled shortcuts available in a context, in registration order.
    pub fn get_available_shortcuts(&self, context: &UIContext) -> Vec<Shortcut> {
        let state = match self.lock() {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "failed to list available shortcuts");
                return Vec::new();
            }
        };

        state
            .shortcuts
            .iter()
            .filter(|s| s.enabled && self.contexts.is_shortcut_available(s, context))
            .cloned()
            .collect()
    }

    /// Find conflicts for a shortcut against this platform and the registry.
    pub fn check_conflicts(&self, shortcut: &Shortcut) -> ConflictReport {
        match self.lock() {
            Ok(state) => self.conflicts_in(&state.shortcuts, shortcut),
            Err(e) => {
                let mut report = ConflictReport::new();
                report.add(Conflict::check_failed(&shortcut.id, e.to_string()));
                report
            }
        }
    }

    fn conflicts_in(&self, registered: &[Shortcut], shortcut: &Shortcut) -> ConflictReport {
        let mut report = ConflictReport::new();

        let combination = match shortcut.combination_for(&self.platform) {
            Ok(combination) => combination,
            Err(e) => {
                report.add(Conflict::check_failed(&shortcut.id, e.to_string()));
                return report;
            }
        };

        if self.reserved.contains(&combination) {
            report.add(Conflict::browser_reserved(
                &shortcut.id,
                combination.clone(),
                self.platform.clone(),
            ));
        }

        for other in registered.iter().filter(|s| s.id != shortcut.id) {
            match other.combination_for(&self.platform) {
                Ok(other_combination) if other_combination == combination => {
                    report.add(Conflict::duplicate(&shortcut.id, combination.clone(), &other.id));
                }
                Ok(_) => {}
                Err(e) => report.add(Conflict::check_failed(
                    &shortcut.id,
                    format!("could not resolve '{}': {}", other.id, e),
                )),
            }
        }

        report
    }
}
