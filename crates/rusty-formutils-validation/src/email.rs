//! Email address predicate backing the `email` rule

/// Longest local part allowed before the `@`
const MAX_LOCAL_LEN: usize = 64;

/// Longest domain part allowed after the `@`
const MAX_DOMAIN_LEN: usize = 255;

/// Checks an address for a plausible `local@domain.tld` shape.
///
/// The check is structural, not RFC 5322 complete:
/// - exactly one `@`, with a non-empty local part and domain
/// - local part limited to alphanumerics and `. _ - +`
/// - domain made of dot-separated labels, no empty label, no label
///   starting or ending with `-`
/// - a top-level label of at least two characters
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if domain.contains('@') {
        return false;
    }

    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return false;
    }

    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    local
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'))
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LEN || !domain.contains('.') {
        return false;
    }

    let mut labels = domain.split('.').peekable();
    while let Some(label) = labels.next() {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }
        // top-level label
        if labels.peek().is_none() && label.chars().count() < 2 {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("test.user@example.co.uk"));
        assert!(is_valid_email("user+tag@example.com"));
        assert!(is_valid_email("user_name@example-domain.com"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example..com"));
        assert!(!is_valid_email("user@-example.com"));
        assert!(!is_valid_email("user@example.c"));
        assert!(!is_valid_email(".user@example.com"));
        assert!(!is_valid_email("us er@example.com"));
    }
}
