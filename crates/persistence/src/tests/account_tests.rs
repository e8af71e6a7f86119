// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Persistence, PersistenceError};

const CREATED_AT: &str = "2026-01-01T00:00:00.000000Z";

#[test]
fn test_create_account_hashes_password() {
    let mut persistence = Persistence::new_in_memory().unwrap();

    let account_id = persistence
        .create_account("runner@example.org", "Runner", "correct horse", "user", CREATED_AT)
        .unwrap();

    let account = persistence
        .get_account_by_email("runner@example.org")
        .unwrap()
        .unwrap();
    assert_eq!(account.account_id, account_id);
    assert_eq!(account.role, "user");
    assert!(account.email_notifications);
    assert_ne!(account.password_hash, "correct horse");
    assert!(
        persistence
            .verify_password("correct horse", &account.password_hash)
            .unwrap()
    );
    assert!(
        !persistence
            .verify_password("wrong horse", &account.password_hash)
            .unwrap()
    );
}

#[test]
fn test_duplicate_email_is_unique_violation() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    persistence
        .create_account("dup@example.org", "One", "password1", "user", CREATED_AT)
        .unwrap();

    let result =
        persistence.create_account("dup@example.org", "Two", "password2", "user", CREATED_AT);
    assert!(matches!(result, Err(PersistenceError::UniqueViolation(_))));
}

#[test]
fn test_count_accounts_with_role_and_settings() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let admin_id = persistence
        .create_account("admin@example.org", "Admin", "password1", "admin", CREATED_AT)
        .unwrap();

    assert_eq!(persistence.count_accounts_with_role("admin").unwrap(), 1);
    assert_eq!(persistence.count_accounts_with_role("user").unwrap(), 0);

    persistence.set_email_notifications(&admin_id, false).unwrap();
    let account = persistence.get_account_by_id(&admin_id).unwrap().unwrap();
    assert!(!account.email_notifications);

    assert!(matches!(
        persistence.set_email_notifications("missing", true),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_session_lifecycle() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let account_id = persistence
        .create_account("s@example.org", "Session", "password1", "user", CREATED_AT)
        .unwrap();

    let session_id = persistence
        .create_session("token-1", &account_id, CREATED_AT, "2026-01-02T00:00:00.000000Z")
        .unwrap();

    let session = persistence.get_session_by_token("token-1").unwrap().unwrap();
    assert_eq!(session.session_id, session_id);
    assert_eq!(session.account_id, account_id);
    assert_eq!(session.last_activity_at, CREATED_AT);

    persistence
        .touch_session(session_id, "2026-01-01T06:00:00.000000Z")
        .unwrap();
    let session = persistence.get_session_by_token("token-1").unwrap().unwrap();
    assert_eq!(session.last_activity_at, "2026-01-01T06:00:00.000000Z");

    persistence.delete_session("token-1").unwrap();
    assert!(persistence.get_session_by_token("token-1").unwrap().is_none());
}

#[test]
fn test_delete_expired_sessions() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let account_id = persistence
        .create_account("e@example.org", "Expiry", "password1", "user", CREATED_AT)
        .unwrap();

    persistence
        .create_session("old", &account_id, CREATED_AT, "2026-01-02T00:00:00.000000Z")
        .unwrap();
    persistence
        .create_session("fresh", &account_id, CREATED_AT, "2026-01-09T00:00:00.000000Z")
        .unwrap();

    let deleted = persistence
        .delete_expired_sessions("2026-01-05T00:00:00.000000Z")
        .unwrap();
    assert_eq!(deleted, 1);
    assert!(persistence.get_session_by_token("old").unwrap().is_none());
    assert!(persistence.get_session_by_token("fresh").unwrap().is_some());
}
