//! Host platform detection and modifier normalization.

use crate::error::{ShortcutError, ShortcutResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Platform a key combination is interpreted on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    /// macOS
    Mac,
    /// Windows
    Windows,
    /// Linux
    Linux,
    /// Any other platform name; modifiers pass through unchanged
    Other(String),
}

impl Platform {
    /// Canonical lower-case name of this platform.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mac => "mac",
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Other(name) => name,
        }
    }

    /// Modifier renames applied when normalizing for this platform.
    fn modifier_table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Mac => &[
                ("ctrl", "meta"),
                ("control", "meta"),
                ("cmd", "meta"),
                ("command", "meta"),
                ("alt", "option"),
            ],
            Self::Windows | Self::Linux => &[
                ("meta", "ctrl"),
                ("cmd", "ctrl"),
                ("command", "ctrl"),
                ("control", "ctrl"),
                ("option", "alt"),
            ],
            Self::Other(_) => &[],
        }
    }
}

impl From<&str> for Platform {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "mac" | "macos" | "darwin" | "osx" => Self::Mac,
            "windows" | "win32" | "win" => Self::Windows,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Platform {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.as_str().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies the host platform.
#[derive(Debug, Clone)]
pub struct PlatformDetector {
    os: String,
}

impl PlatformDetector {
    /// Create a detector for the OS this binary was built for.
    pub fn new() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
        }
    }

    /// Create a detector over an explicit OS identifier.
    pub fn with_os(os: impl Into<String>) -> Self {
        Self { os: os.into() }
    }

    /// Get the detected platform.
    ///
    /// Only macOS, Windows and Linux are recognized.
    pub fn get_platform(&self) -> ShortcutResult<Platform> {
        match self.os.trim().to_lowercase().as_str() {
            "macos" | "darwin" => Ok(Platform::Mac),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            other => {
                error!(os = %other, "unrecognized host platform");
                Err(ShortcutError::Platform(format!(
                    "unsupported operating system: '{}'",
                    other
                )))
            }
        }
    }
}

impl Default for PlatformDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a key combination for a platform.
///
/// Every token is lower-cased, then the platform's modifier renames are
/// applied. Token order is preserved. Tokens are taken through `Display`, so
/// non-string tokens are accepted in their string form.
pub fn normalize_combination<T: fmt::Display>(
    combination: &[T],
    platform: &Platform,
) -> ShortcutResult<Vec<String>> {
    if combination.is_empty() {
        return Err(ShortcutError::InvalidCombination(
            "key combination is empty".to_string(),
        ));
    }

    let table = platform.modifier_table();
    let normalized = combination
        .iter()
        .map(|token| {
            let token = token.to_string().trim().to_lowercase();
            table
                .iter()
                .find(|(from, _)| *from == token)
                .map(|(_, to)| to.to_string())
                .unwrap_or(token)
        })
        .collect();

    Ok(normalized)
}

/// Check whether a token names a modifier key on any platform.
pub fn is_modifier(token: &str) -> bool {
    matches!(
        token.to_lowercase().as_str(),
        "ctrl" | "control" | "meta" | "cmd" | "command" | "super" | "alt" | "option" | "shift"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_mac() {
        let combo = normalize_combination(&["ctrl", "S"], &Platform::Mac).unwrap();
        assert_eq!(combo, vec!["meta", "s"]);

        let combo = normalize_combination(&["ctrl", "alt", "s"], &Platform::Mac).unwrap();
        assert_eq!(combo, vec!["meta", "option", "s"]);
    }

    #[test]
    fn test_normalize_windows_linux() {
        for platform in [Platform::Windows, Platform::Linux] {
            let combo = normalize_combination(&["ctrl", "S"], &platform).unwrap();
            assert_eq!(combo, vec!["ctrl", "s"]);

            let combo = normalize_combination(&["meta", "shift", "k"], &platform).unwrap();
            assert_eq!(combo, vec!["ctrl", "shift", "k"]);
        }
    }

    #[test]
    fn test_normalize_unknown_platform_passes_through() {
        let platform = Platform::from("beos");
        assert_eq!(platform, Platform::Other("beos".to_string()));

        let combo = normalize_combination(&["Meta", "Alt", "X"], &platform).unwrap();
        assert_eq!(combo, vec!["meta", "alt", "x"]);
    }

    #[test]
    fn test_normalize_non_string_tokens() {
        let combo = normalize_combination(&[1, 2], &Platform::Linux).unwrap();
        assert_eq!(combo, vec!["1", "2"]);
    }

    #[test]
    fn test_normalize_empty() {
        let empty: [&str; 0] = [];
        let err = normalize_combination(&empty, &Platform::Mac).unwrap_err();
        assert!(matches!(err, ShortcutError::InvalidCombination(_)));
    }

    #[test]
    fn test_detector() {
        assert_eq!(PlatformDetector::with_os("macos").get_platform().unwrap(), Platform::Mac);
        assert_eq!(
            PlatformDetector::with_os("windows").get_platform().unwrap(),
            Platform::Windows
        );
        assert_eq!(PlatformDetector::with_os("linux").get_platform().unwrap(), Platform::Linux);

        let err = PlatformDetector::with_os("plan9").get_platform().unwrap_err();
        assert!(matches!(err, ShortcutError::Platform(_)));
    }

    #[test]
    fn test_platform_names() {
        assert_eq!(Platform::from("Darwin"), Platform::Mac);
        assert_eq!(Platform::from("win32"), Platform::Windows);
        assert_eq!(Platform::Mac.to_string(), "mac");
        assert_eq!(String::from(Platform::Linux), "linux");
    }

    #[test]
    fn test_is_modifier() {
        assert!(is_modifier("Ctrl"));
        assert!(is_modifier("option"));
        assert!(!is_modifier("s"));
        assert!(!is_modifier("f5"));
    }

    proptest! {
        #[test]
        fn prop_normalize_case_insensitive(key in "[a-zA-Z]{1,8}", idx in 0usize..3) {
            let platform = [Platform::Mac, Platform::Windows, Platform::Linux][idx].clone();
            let upper_keys = ["CTRL".to_string(), key.to_uppercase()];
            let lower_keys = ["ctrl".to_string(), key.to_lowercase()];
            let upper = normalize_combination(&upper_keys, &platform).unwrap();
            let lower = normalize_combination(&lower_keys, &platform).unwrap();
            prop_assert_eq!(&upper, &lower);

            let again = normalize_combination(&upper, &platform).unwrap();
            prop_assert_eq!(again, upper);
        }
    }
}
