//! Sign-up input rules.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::error::AuthError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static regex is valid")
});

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 2..=50;
const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 8..=32;

/// Registration payload as submitted by a caller.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
}

impl RegisterRequest {
    /// Check every rule and report all that fail in one error.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut problems = Vec::new();

        let username_len = self.username.chars().count();
        if username_len == 0 {
            problems.push("username is required".to_string());
        } else if !USERNAME_LEN.contains(&username_len) {
            problems.push("username must be between 2 and 50 characters".to_string());
        }

        if self.email.is_empty() {
            problems.push("email is required".to_string());
        } else if !EMAIL_RE.is_match(&self.email) {
            problems.push("email is not a valid address".to_string());
        }

        problems.extend(password_problems(&self.password));

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AuthError::InvalidRegistration(problems.join("; ")))
        }
    }
}

/// Punctuation or symbol, ASCII or not.
fn is_special(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control()
}

fn password_problems(password: &str) -> Vec<String> {
    let password = password.trim();
    let mut problems = Vec::new();

    if !PASSWORD_LEN.contains(&password.chars().count()) {
        problems.push("password must be between 8 and 32 characters".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        problems.push("password needs an uppercase letter".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        problems.push("password needs a lowercase letter".to_string());
    }
    if !password.chars().any(char::is_numeric) {
        problems.push("password needs a digit".to_string());
    }
    if !password.chars().any(is_special) {
        problems.push("password needs a punctuation or symbol character".to_string());
    }

    problems
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            bio: String::new(),
        }
    }

    fn problems(req: &RegisterRequest) -> String {
        match req.validate() {
            Err(AuthError::InvalidRegistration(msg)) => msg,
            other => panic!("expected InvalidRegistration, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_request() {
        assert!(request("alice", "a@x.com", "Abc12345!").validate().is_ok());
    }

    #[test]
    fn username_length_bounds() {
        assert!(problems(&request("", "a@x.com", "Abc12345!")).contains("username is required"));
        assert!(problems(&request("a", "a@x.com", "Abc12345!")).contains("between 2 and 50"));
        assert!(request("ab", "a@x.com", "Abc12345!").validate().is_ok());
        assert!(request(&"a".repeat(50), "a@x.com", "Abc12345!").validate().is_ok());
        assert!(request(&"a".repeat(51), "a@x.com", "Abc12345!").validate().is_err());
    }

    #[test]
    fn rejects_bad_email() {
        for email in ["alice", "alice@x", "@x.com", "a@x.c", "a b@x.com"] {
            assert!(
                problems(&request("alice", email, "Abc12345!")).contains("email"),
                "{email} should be rejected"
            );
        }
        assert!(problems(&request("alice", "", "Abc12345!")).contains("email is required"));
    }

    #[test]
    fn password_rules() {
        assert!(problems(&request("alice", "a@x.com", "Ab1!")).contains("between 8 and 32"));
        assert!(problems(&request("alice", "a@x.com", "abc12345!")).contains("uppercase"));
        assert!(problems(&request("alice", "a@x.com", "ABC12345!")).contains("lowercase"));
        assert!(problems(&request("alice", "a@x.com", "Abcdefgh!")).contains("digit"));
        assert!(problems(&request("alice", "a@x.com", "Abc123456")).contains("symbol"));
        assert!(problems(&request("alice", "a@x.com", &format!("Aa1!{}", "x".repeat(29))))
            .contains("between 8 and 32"));
    }

    #[test]
    fn non_ascii_symbols_and_digits_count() {
        assert!(request("alice", "a@x.com", "Abc1234£").validate().is_ok());
        assert!(request("alice", "a@x.com", "Abcdefg€٣").validate().is_ok());
        assert!(problems(&request("alice", "a@x.com", "Abc12345 ")).contains("symbol"));
    }

    #[test]
    fn password_is_trimmed_before_length_check() {
        assert!(problems(&request("alice", "a@x.com", "  Ab1!x  ")).contains("between 8 and 32"));
    }

    #[test]
    fn reports_every_failure() {
        let msg = problems(&request("a", "nope", "short"));
        assert!(msg.contains("username"));
        assert!(msg.contains("email"));
        assert!(msg.contains("between 8 and 32"));
        assert!(msg.contains("uppercase"));
        assert!(msg.contains("digit"));
    }
}
