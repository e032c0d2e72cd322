//! Log sanitization utilities
//!
//! Keeps response bodies short in debug/error logs and never prints
//! credentials in full.

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of leading characters of a key kept visible by [`redact_key`].
const VISIBLE_KEY_PREFIX: usize = 4;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Show only the first few characters of an API key.
pub fn redact_key(key: &str) -> String {
    let visible = &key[..floor_char_boundary(key, VISIBLE_KEY_PREFIX)];
    if visible.len() == key.len() {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_unchanged() {
        let s = r#"{"error":["Record name is invalid."]}"#;
        assert_eq!(truncate_for_log(s), s);
    }

    #[test]
    fn long_body_truncated() {
        let s = "x".repeat(TRUNCATE_LIMIT * 3);
        let result = truncate_for_log(&s);
        assert!(result.ends_with(&format!("[truncated, total {} bytes]", s.len())));
        assert!(result.len() < s.len());
    }

    #[test]
    fn multibyte_chars_safe() {
        let s = "é".repeat(200);
        assert!(truncate_for_log(&s).contains("... [truncated, total 400 bytes]"));
    }

    #[test]
    fn key_redaction() {
        assert_eq!(redact_key("1c1a3c91-4770"), "1c1a****");
        assert_eq!(redact_key("abc"), "****");
        assert_eq!(redact_key(""), "****");
    }
}
