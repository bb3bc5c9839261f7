//! String predicates

/// `alpha`: non-empty and ASCII letters only
pub fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

/// `alphanum`: non-empty and ASCII letters or digits only
pub fn is_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// `numeric`: an optionally signed decimal number (`-12`, `+3.5`, `42`)
pub fn is_numeric(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    all_digits(whole) && fraction.map_or(true, all_digits)
}

/// URL validation
///
/// Basic validation: an http/https scheme followed by a host containing a dot.
pub fn is_valid_url(url: &str) -> bool {
    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return false;
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = host.rsplit('@').next().unwrap_or(host);

    !host.is_empty()
        && host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && !host.chars().any(char::is_whitespace)
}

/// String matching predicates
pub fn contains(s: &str, substring: &str) -> bool {
    s.contains(substring)
}

pub fn starts_with(s: &str, prefix: &str) -> bool {
    s.starts_with(prefix)
}

pub fn ends_with(s: &str, suffix: &str) -> bool {
    s.ends_with(suffix)
}

/// `oneof`: value must equal one of the space-separated choices
pub fn is_one_of(value: &str, choices: &str) -> bool {
    choices.split_whitespace().any(|choice| choice == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_and_alphanumeric() {
        assert!(is_alpha("abcXYZ"));
        assert!(!is_alpha("abc1"));
        assert!(!is_alpha(""));

        assert!(is_alphanumeric("abc123"));
        assert!(!is_alphanumeric("abc 123"));
        assert!(!is_alphanumeric(""));
    }

    #[test]
    fn test_numeric() {
        assert!(is_numeric("42"));
        assert!(is_numeric("-12"));
        assert!(is_numeric("+3.5"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("-"));
        assert!(!is_numeric("1."));
        assert!(!is_numeric(".5"));
        assert!(!is_numeric("12a"));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://test.co.uk"));
        assert!(is_valid_url("https://example.com/path?q=1"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("http://nodomain"));
    }

    #[test]
    fn test_string_matching() {
        assert!(contains("hello world", "world"));
        assert!(!contains("hello world", "foo"));

        assert!(starts_with("user_john", "user_"));
        assert!(!starts_with("admin_john", "user_"));

        assert!(ends_with("file.txt", ".txt"));
        assert!(!ends_with("file.doc", ".txt"));
    }

    #[test]
    fn test_one_of() {
        assert!(is_one_of("admin", "admin user guest"));
        assert!(is_one_of("guest", "admin  user guest"));
        assert!(!is_one_of("superuser", "admin user guest"));
        assert!(!is_one_of("", "admin user"));
    }
}
