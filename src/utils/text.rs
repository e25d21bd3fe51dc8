//! Text cleanup helpers shared by the normalizer, classifier and signature

/// Zero-width and byte-order-mark characters that sneak in from copy/paste
const INVISIBLE_CHARS: &[char] = &['\u{feff}', '\u{200b}', '\u{200c}', '\u{200d}', '\u{2060}'];

/// Remove control and invisible characters, turning whitespace controls
/// (tabs, newlines) into plain spaces
pub fn strip_control_chars(value: &str) -> String {
    value
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if c.is_control() || INVISIBLE_CHARS.contains(&c) {
                None
            } else {
                Some(c)
            }
        })
        .collect()
}

/// Trim and collapse every run of whitespace into a single space
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Full field cleanup: control characters stripped, whitespace collapsed
pub fn clean_field(value: &str) -> String {
    collapse_whitespace(&strip_control_chars(value))
}

/// Case-insensitive comparison key used for signatures and override lookups
pub fn normalize_key(value: &str) -> String {
    clean_field(value).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_field() {
        assert_eq!(clean_field("  BBC\tOne \n HD "), "BBC One HD");
        assert_eq!(clean_field("\u{feff}CNN\u{0007}"), "CNN");
        assert_eq!(clean_field("   "), "");
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" espn   HD "), "espn hd");
        assert_eq!(normalize_key("ESPN HD"), normalize_key(" espn   hd "));
    }

    #[test]
    fn test_strip_control_chars_keeps_unicode() {
        assert_eq!(strip_control_chars("Télé 5"), "Télé 5");
        assert_eq!(strip_control_chars("a\u{200b}b"), "ab");
    }
}
