//! Nickname and channel-name validation.
//!
//! Both checks are small enough to express as direct character scans, which
//! also keeps the length bounds exact.

/// Check a nickname: 1 to 9 characters drawn from `[a-zA-Z0-9-]`.
pub fn is_valid_nick(nick: &str) -> bool {
    if nick.is_empty() || nick.len() > 9 {
        return false;
    }
    nick.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Check a channel name: `#` followed by 1 to 200 characters, none of which
/// may be NUL, BEL, CR, LF, space, comma, colon, or slash.
pub fn is_valid_channel_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('#') else {
        return false;
    };
    if rest.is_empty() || rest.len() > 200 {
        return false;
    }
    rest.chars()
        .all(|c| !matches!(c, '\0' | '\x07' | '\n' | '\r' | ' ' | ',' | ':' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nick_length_bounds() {
        assert!(!is_valid_nick(""));
        assert!(is_valid_nick("a"));
        assert!(is_valid_nick("abcdefghi"));
        assert!(!is_valid_nick("abcdefghij"));
    }

    #[test]
    fn nick_charset() {
        assert!(is_valid_nick("alice"));
        assert!(is_valid_nick("Alice-2"));
        assert!(!is_valid_nick("al ice"));
        assert!(!is_valid_nick("al_ice"));
        assert!(!is_valid_nick("nick!"));
    }

    #[test]
    fn channel_needs_hash_prefix() {
        assert!(!is_valid_channel_name(""));
        assert!(!is_valid_channel_name("#"));
        assert!(!is_valid_channel_name("room"));
        assert!(is_valid_channel_name("#a"));
    }

    #[test]
    fn channel_length_bounds() {
        let ok = format!("#{}", "a".repeat(200));
        let too_long = format!("#{}", "a".repeat(201));
        assert!(is_valid_channel_name(&ok));
        assert!(!is_valid_channel_name(&too_long));
    }

    #[test]
    fn channel_forbidden_characters() {
        for bad in ["#a b", "#a,b", "#a:b", "#a/b", "#a\0b", "#a\x07b", "#a\nb", "#a\rb"] {
            assert!(!is_valid_channel_name(bad), "{:?} should be invalid", bad);
        }
        assert!(is_valid_channel_name("#room.with-dots_and+more"));
    }
}
