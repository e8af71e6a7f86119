// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password rules applied at registration and admin bootstrap.

use thiserror::Error;

/// bcrypt only reads the first 72 bytes of its input.
const BCRYPT_MAX_BYTES: usize = 72;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min_chars} characters long")]
    TooShort { min_chars: usize },

    #[error("Password must be at most {max_bytes} bytes long")]
    TooLong { max_bytes: usize },

    #[error("Password must not be the same as the email address")]
    SameAsEmail,
}

/// Length bounds for account passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    /// Minimum length, counted in characters.
    pub min_chars: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_chars: 8 }
    }
}

impl PasswordPolicy {
    /// Checks `password` for the account `email`.
    ///
    /// The email comparison ignores case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns the first rule the password breaks.
    pub fn validate(&self, password: &str, email: &str) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_chars {
            return Err(PasswordPolicyError::TooShort {
                min_chars: self.min_chars,
            });
        }
        if password.len() > BCRYPT_MAX_BYTES {
            return Err(PasswordPolicyError::TooLong {
                max_bytes: BCRYPT_MAX_BYTES,
            });
        }
        if password.trim().eq_ignore_ascii_case(email.trim()) {
            return Err(PasswordPolicyError::SameAsEmail);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "runner@example.org";

    #[test]
    fn test_accepts_reasonable_password() {
        assert!(PasswordPolicy::default().validate("trail-runner-42", EMAIL).is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        assert_eq!(
            PasswordPolicy::default().validate("short", EMAIL),
            Err(PasswordPolicyError::TooShort { min_chars: 8 })
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("éééé123", EMAIL).is_err());
        assert!(policy.validate("éééé1234", EMAIL).is_ok());
    }

    #[test]
    fn test_rejects_password_bcrypt_would_truncate() {
        let long: String = "a".repeat(73);
        assert_eq!(
            PasswordPolicy::default().validate(&long, EMAIL),
            Err(PasswordPolicyError::TooLong { max_bytes: 72 })
        );
        assert!(PasswordPolicy::default().validate(&"a".repeat(72), EMAIL).is_ok());
    }

    #[test]
    fn test_rejects_email_as_password() {
        assert_eq!(
            PasswordPolicy::default().validate("Runner@Example.org", EMAIL),
            Err(PasswordPolicyError::SameAsEmail)
        );
    }
}
