//! Conflict detection results.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a shortcut conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictSeverity {
    /// Shortcut may be shadowed by the host (browser, OS)
    Warning,
    /// Another registered shortcut uses the same combination
    Error,
}

/// What a shortcut conflicts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    /// Combination is reserved by the browser on this platform
    BrowserReserved { platform: Platform },
    /// Another registered shortcut normalizes to the same combination
    Duplicate { other_id: String },
    /// The check itself could not be completed
    CheckFailed { reason: String },
}

/// A single detected conflict.
#[derive(Debug, Clone)]
pub struct Conflict {
    /// Shortcut being checked
    pub shortcut_id: String,
    /// Normalized combination, empty if it could not be resolved
    pub combination: Vec<String>,
    pub kind: ConflictKind,
    pub severity: ConflictSeverity,
}

impl Conflict {
    /// Create a browser-reserved conflict.
    pub fn browser_reserved(
        shortcut_id: impl Into<String>,
        combination: Vec<String>,
        platform: Platform,
    ) -> Self {
        Self {
            shortcut_id: shortcut_id.into(),
            combination,
            kind: ConflictKind::BrowserReserved { platform },
            severity: ConflictSeverity::Warning,
        }
    }

    /// Create a conflict with another registered shortcut.
    pub fn duplicate(
        shortcut_id: impl Into<String>,
        combination: Vec<String>,
        other_id: impl Into<String>,
    ) -> Self {
        Self {
            shortcut_id: shortcut_id.into(),
            combination,
            kind: ConflictKind::Duplicate {
                other_id: other_id.into(),
            },
            severity: ConflictSeverity::Error,
        }
    }

    /// Record that the check could not run.
    pub fn check_failed(shortcut_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            shortcut_id: shortcut_id.into(),
            combination: Vec::new(),
            kind: ConflictKind::CheckFailed {
                reason: reason.into(),
            },
            severity: ConflictSeverity::Warning,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.combination.join("+");
        match &self.kind {
            ConflictKind::BrowserReserved { platform } => write!(
                f,
                "'{}' is reserved by the browser on {}",
                keys, platform
            ),
            ConflictKind::Duplicate { other_id } => write!(
                f,
                "'{}' is already bound to shortcut '{}'",
                keys, other_id
            ),
            ConflictKind::CheckFailed { reason } => {
                write!(f, "conflict check failed: {}", reason)
            }
        }
    }
}

/// All conflicts found for a shortcut.
#[derive(Debug, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    /// Create an empty conflict report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a conflict to the report.
    pub fn add(&mut self, conflict: Conflict) {
        self.conflicts.push(conflict);
    }

    /// Check if there are any conflicts.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Check if there are any error-level conflicts.
    pub fn has_errors(&self) -> bool {
        self.conflicts.iter().any(|c| c.severity == ConflictSeverity::Error)
    }

    /// Get only error-level conflicts.
    pub fn errors(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| c.severity == ConflictSeverity::Error)
    }

    /// Get only warning-level conflicts.
    pub fn warnings(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| c.severity == ConflictSeverity::Warning)
    }

    /// Human-readable description of each conflict, in detection order.
    ///
    /// This is the string list `KeyboardHandler::check_conflicts` callers
    /// show: one line per browser-reserved or duplicate combination, and one
    /// line per check that could not run. An empty list means no conflicts.
    pub fn descriptions(&self) -> Vec<String> {
        self.conflicts.iter().map(|c| c.to_string()).collect()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No conflicts detected");
        }

        for conflict in &self.conflicts {
            let severity = match conflict.severity {
                ConflictSeverity::Error => "ERROR",
                ConflictSeverity::Warning => "WARNING",
            };
            writeln!(f, "[{}] {}: {}", severity, conflict.shortcut_id, conflict)?;
        }

        Ok(())
    }
}
