//! Key notation parser.

use crate::error::{ShortcutError, ShortcutResult};

/// Parse a key notation string into combination tokens.
///
/// Supported formats:
/// - `"ctrl+s"`, `"Ctrl+S"`, `"<ctrl+s>"` - `["ctrl", "s"]`
/// - `"ctrl+shift+tab"` - `["ctrl", "shift", "tab"]`
/// - `"ctrl++"` - `["ctrl", "+"]` (the plus key itself)
/// - `"f5"`, `"escape"` - single terminal key
///
/// Tokens are lower-cased but not platform-normalized.
pub fn parse_combination(s: &str) -> ShortcutResult<Vec<String>> {
    let s = s.trim();

    // Handle angle bracket notation <ctrl+s>
    let s = s.strip_prefix('<').and_then(|s| s.strip_suffix('>')).unwrap_or(s);

    if s.is_empty() {
        return Err(ShortcutError::InvalidCombination(
            "empty key notation".to_string(),
        ));
    }

    // A trailing "++" means the terminal key is '+'
    let (head, plus_key) = match s.strip_suffix("++") {
        Some(head) => (head, true),
        None if s == "+" => ("", true),
        None => (s, false),
    };

    let mut tokens = Vec::new();
    if !head.is_empty() {
        for part in head.split('+') {
            let part = part.trim();
            if part.is_empty() {
                return Err(ShortcutError::InvalidCombination(format!(
                    "empty key in '{}'",
                    s
                )));
            }
            tokens.push(part.to_lowercase());
        }
    }

    if plus_key {
        tokens.push("+".to_string());
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        assert_eq!(parse_combination("a").unwrap(), vec!["a"]);
        assert_eq!(parse_combination("F5").unwrap(), vec!["f5"]);
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(parse_combination("ctrl+s").unwrap(), vec!["ctrl", "s"]);
        assert_eq!(
            parse_combination("Ctrl+Shift+S").unwrap(),
            vec!["ctrl", "shift", "s"]
        );
        assert_eq!(parse_combination("<alt+x>").unwrap(), vec!["alt", "x"]);
    }

    #[test]
    fn test_parse_plus_key() {
        assert_eq!(parse_combination("ctrl++").unwrap(), vec!["ctrl", "+"]);
        assert_eq!(parse_combination("+").unwrap(), vec!["+"]);
    }

    #[test]
    fn test_parse_error() {
        assert!(parse_combination("").is_err());
        assert!(parse_combination("  ").is_err());
        assert!(parse_combination("ctrl++s").is_err());
        assert!(parse_combination("+s").is_err());
    }
}
