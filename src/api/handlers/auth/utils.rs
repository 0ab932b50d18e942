//! Small helpers for input validation and client identification.

use axum::http::HeaderMap;
use regex::Regex;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Password policy for sign-up: at least 8 characters with upper, lower,
/// digit, and special characters. Returns the first violation.
pub(crate) fn password_policy_violation(password: &str) -> Option<&'static str> {
    if password.chars().count() < 8 {
        return Some("Password must be at least 8 characters");
    }
    if !password.chars().any(char::is_uppercase) {
        return Some("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(char::is_lowercase) {
        return Some("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain at least one number");
    }
    if password.chars().all(char::is_alphanumeric) {
        return Some("Password must contain at least one special character");
    }
    None
}

/// Extract a client IP for rate limiting from common proxy headers.
/// Falls back to `"unknown"` so all unidentified clients share one budget.
pub(crate) fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| "unknown".to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn password_policy_catches_each_violation() {
        assert_eq!(
            password_policy_violation("Ab1!"),
            Some("Password must be at least 8 characters")
        );
        assert_eq!(
            password_policy_violation("lowercase1!"),
            Some("Password must contain at least one uppercase letter")
        );
        assert_eq!(
            password_policy_violation("UPPERCASE1!"),
            Some("Password must contain at least one lowercase letter")
        );
        assert_eq!(
            password_policy_violation("NoNumbers!"),
            Some("Password must contain at least one number")
        );
        assert_eq!(
            password_policy_violation("NoSpecial1"),
            Some("Password must contain at least one special character")
        );
        assert_eq!(password_policy_violation("Password1!"), None);
    }

    #[test]
    fn client_ip_prefers_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(client_ip(&headers), "1.2.3.4");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        assert_eq!(client_ip(&headers), "9.9.9.9");
    }

    #[test]
    fn client_ip_defaults_to_unknown() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
