// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Normalizes an account email for storage and lookup.
///
/// Emails are trimmed and lower-cased so that lookups are
/// case-insensitive. The check is shallow: one `@` with a
/// non-empty local part and domain.
///
/// # Errors
///
/// Returns an error if the address is empty or malformed.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let normalized: String = email.trim().to_lowercase();

    match normalized.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !normalized.contains(char::is_whitespace) =>
        {
            Ok(normalized)
        }
        _ => Err(DomainError::InvalidEmail(email.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Runner@Example.FR ").unwrap(),
            "runner@example.fr"
        );
    }

    #[test]
    fn test_malformed_emails_are_rejected() {
        for bad in ["", "runner", "@example.fr", "runner@", "a@b@c", "ru nner@x.fr"] {
            assert!(
                matches!(normalize_email(bad), Err(DomainError::InvalidEmail(_))),
                "{bad} should be rejected"
            );
        }
    }
}
