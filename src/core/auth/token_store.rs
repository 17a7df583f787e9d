//! Persisted session material
//!
//! The access token, refresh token, user snapshot and absolute expiry are
//! kept together as one [`StoredAuth`] JSON record under a single storage
//! key, so a write either lands completely or not at all.
//!
//! Expiry is a client-side policy: a token counts as expired one minute
//! before its recorded expiry. Tokens are never validated cryptographically.
//!
//! Records written by older builds under four separate keys are picked up
//! once and folded into the single record.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::models::{AuthResponse, SessionUser};
use crate::core::clock::Clock;
use crate::core::storage::{KeyValueStore, StorageError};

/// Storage key of the session record
pub const AUTH_RECORD_KEY: &str = "lumera_auth";

/// Keys used by older builds, one field per key
pub const LEGACY_ACCESS_TOKEN_KEY: &str = "lumera_access_token";
pub const LEGACY_REFRESH_TOKEN_KEY: &str = "lumera_refresh_token";
pub const LEGACY_USER_KEY: &str = "lumera_user";
pub const LEGACY_TOKEN_EXPIRY_KEY: &str = "lumera_token_expiry";

const LEGACY_KEYS: [&str; 4] = [
    LEGACY_ACCESS_TOKEN_KEY,
    LEGACY_REFRESH_TOKEN_KEY,
    LEGACY_USER_KEY,
    LEGACY_TOKEN_EXPIRY_KEY,
];

/// Tokens are treated as expired this long before their recorded expiry
pub const EXPIRY_MARGIN_MILLIS: i64 = 60_000;

/// Session record as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAuth {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
    /// Absolute access token expiry, fixed at save time
    pub expiry_epoch_millis: i64,
}

/// Single owner of the persisted session
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Persist a login/register/refresh response
    ///
    /// `expires_in` is in seconds; the absolute expiry is computed once here.
    pub fn save_auth(&self, response: &AuthResponse) -> Result<(), StorageError> {
        let record = StoredAuth {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            user: response.user.clone(),
            expiry_epoch_millis: self
                .clock
                .now_millis()
                .saturating_add(response.expires_in.saturating_mul(1000)),
        };
        self.write(&record)
    }

    /// Replace the user snapshot, keeping tokens and expiry
    pub fn update_user(&self, user: &SessionUser) -> Result<(), StorageError> {
        match self.load() {
            Some(mut record) => {
                record.user = user.clone();
                self.write(&record)
            }
            None => Ok(()),
        }
    }

    fn write(&self, record: &StoredAuth) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)
            .map_err(|_| StorageError::WriteFailed(AUTH_RECORD_KEY.to_string()))?;
        self.storage.set_item(AUTH_RECORD_KEY, &json)?;
        self.remove_legacy_keys();
        Ok(())
    }

    /// Current record, if any
    ///
    /// A corrupted record is dropped and reads as no session.
    pub fn load(&self) -> Option<StoredAuth> {
        match self.storage.get_item(AUTH_RECORD_KEY) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(record) => Some(record),
                Err(_) => {
                    tracing::warn!("discarding malformed stored session");
                    let _ = self.storage.remove_item(AUTH_RECORD_KEY);
                    None
                }
            },
            None => self.migrate_legacy(),
        }
    }

    fn migrate_legacy(&self) -> Option<StoredAuth> {
        let access_token = self.storage.get_item(LEGACY_ACCESS_TOKEN_KEY)?;
        let refresh_token = self.storage.get_item(LEGACY_REFRESH_TOKEN_KEY)?;
        let user = self
            .storage
            .get_item(LEGACY_USER_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())?;
        let expiry_epoch_millis = self
            .storage
            .get_item(LEGACY_TOKEN_EXPIRY_KEY)?
            .trim()
            .parse()
            .ok()?;

        let record = StoredAuth {
            access_token,
            refresh_token,
            user,
            expiry_epoch_millis,
        };
        if self.write(&record).is_ok() {
            tracing::debug!("migrated legacy session keys");
        }
        Some(record)
    }

    fn remove_legacy_keys(&self) {
        for key in LEGACY_KEYS {
            let _ = self.storage.remove_item(key);
        }
    }

    pub fn get_access_token(&self) -> Option<String> {
        self.load().map(|r| r.access_token)
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        self.load().map(|r| r.refresh_token)
    }

    pub fn get_user(&self) -> Option<SessionUser> {
        self.load().map(|r| r.user)
    }

    /// Absolute expiry in epoch milliseconds
    pub fn get_token_expiry(&self) -> Option<i64> {
        self.load().map(|r| r.expiry_epoch_millis)
    }

    pub fn has_access_token(&self) -> bool {
        self.get_access_token().is_some_and(|t| !t.is_empty())
    }

    /// True when no expiry is recorded or we are inside the safety margin
    pub fn is_token_expired(&self) -> bool {
        match self.get_token_expiry() {
            Some(expiry) => {
                self.clock.now_millis() > expiry.saturating_sub(EXPIRY_MARGIN_MILLIS)
            }
            None => true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.has_access_token() && !self.is_token_expired()
    }

    /// Remove the session record (and any legacy keys)
    pub fn clear_auth(&self) -> Result<(), StorageError> {
        self.remove_legacy_keys();
        self.storage.remove_item(AUTH_RECORD_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::models::Role;
    use crate::core::clock::ManualClock;
    use crate::core::storage::MemoryStore;

    const T0: i64 = 1_700_000_000_000;

    fn store() -> (TokenStore, Arc<MemoryStore>, Arc<ManualClock>) {
        let storage = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        (TokenStore::new(storage.clone(), clock.clone()), storage, clock)
    }

    fn user() -> SessionUser {
        SessionUser {
            id: Some("u-1".to_string()),
            email: "ana@lumera.io".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            role: Role::Educator,
            avatar_url: Some("https://cdn.lumera.io/a.png".to_string()),
        }
    }

    fn response(expires_in: i64) -> AuthResponse {
        AuthResponse {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: Some("Bearer".to_string()),
            expires_in,
            user: user(),
        }
    }

    // ========================================================================
    // Save / Read
    // ========================================================================

    #[test]
    fn test_save_then_read_all_fields() {
        let (tokens, storage, _) = store();
        tokens.save_auth(&response(3600)).unwrap();

        assert_eq!(tokens.get_access_token(), Some("access".to_string()));
        assert_eq!(tokens.get_refresh_token(), Some("refresh".to_string()));
        assert_eq!(tokens.get_user(), Some(user()));
        assert_eq!(tokens.get_token_expiry(), Some(T0 + 3_600_000));
        // One record, one key
        assert_eq!(storage.len(), 1);
        assert!(storage.get_item(AUTH_RECORD_KEY).is_some());
    }

    #[test]
    fn test_expiry_not_recomputed_on_read() {
        let (tokens, _, clock) = store();
        tokens.save_auth(&response(100)).unwrap();

        clock.advance_secs(50);
        assert_eq!(tokens.get_token_expiry(), Some(T0 + 100_000));
    }

    #[test]
    fn test_empty_store_reads_none() {
        let (tokens, _, _) = store();

        assert_eq!(tokens.get_access_token(), None);
        assert_eq!(tokens.get_refresh_token(), None);
        assert_eq!(tokens.get_user(), None);
        assert_eq!(tokens.get_token_expiry(), None);
        assert!(tokens.is_token_expired());
        assert!(!tokens.is_authenticated());
    }

    // ========================================================================
    // Expiry Margin
    // ========================================================================

    #[test]
    fn test_expiry_margin_boundary() {
        for expires_in in [61, 120, 900, 3600] {
            let (tokens, _, clock) = store();
            tokens.save_auth(&response(expires_in)).unwrap();

            clock.set_millis(T0 + (expires_in - 61) * 1000);
            assert!(!tokens.is_token_expired(), "E={} at E-61s", expires_in);

            clock.set_millis(T0 + (expires_in - 60) * 1000);
            assert!(!tokens.is_token_expired(), "E={} at exactly E-60s", expires_in);

            clock.set_millis(T0 + (expires_in - 59) * 1000);
            assert!(tokens.is_token_expired(), "E={} at E-59s", expires_in);
        }
    }

    #[test]
    fn test_short_lived_token_is_expired_immediately() {
        let (tokens, _, _) = store();
        tokens.save_auth(&response(30)).unwrap();

        assert!(tokens.has_access_token());
        assert!(tokens.is_token_expired());
        assert!(!tokens.is_authenticated());
    }

    #[test]
    fn test_is_authenticated_flips_with_clock() {
        let (tokens, _, clock) = store();
        tokens.save_auth(&response(3600)).unwrap();
        assert!(tokens.is_authenticated());

        clock.advance_secs(3600);
        assert!(!tokens.is_authenticated());
    }

    #[test]
    fn test_huge_expires_in_saturates() {
        let (tokens, _, clock) = store();
        tokens.save_auth(&response(i64::MAX / 100)).unwrap();

        assert_eq!(tokens.get_token_expiry(), Some(i64::MAX));
        assert!(tokens.is_authenticated());

        clock.advance_secs(365 * 24 * 3600);
        assert!(tokens.is_authenticated());
    }

    #[test]
    fn test_negative_expires_in_is_expired() {
        let (tokens, _, _) = store();
        tokens.save_auth(&response(i64::MIN / 100)).unwrap();

        assert!(tokens.is_token_expired());
        assert!(!tokens.is_authenticated());
    }

    #[test]
    fn test_empty_access_token_is_not_authenticated() {
        let (tokens, _, _) = store();
        let mut r = response(3600);
        r.access_token = String::new();
        tokens.save_auth(&r).unwrap();

        assert!(!tokens.has_access_token());
        assert!(!tokens.is_authenticated());
    }

    // ========================================================================
    // Clear / Corruption
    // ========================================================================

    #[test]
    fn test_clear_auth_removes_everything() {
        let (tokens, storage, _) = store();
        tokens.save_auth(&response(3600)).unwrap();

        tokens.clear_auth().unwrap();

        assert_eq!(tokens.get_access_token(), None);
        assert_eq!(tokens.get_refresh_token(), None);
        assert_eq!(tokens.get_user(), None);
        assert_eq!(tokens.get_token_expiry(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_malformed_record_fails_soft_and_is_removed() {
        let (tokens, storage, _) = store();
        storage.set_item(AUTH_RECORD_KEY, "{\"accessToken\": 12").unwrap();

        assert_eq!(tokens.get_user(), None);
        assert_eq!(storage.get_item(AUTH_RECORD_KEY), None);
        assert!(!tokens.is_authenticated());
    }

    #[test]
    fn test_update_user_keeps_tokens() {
        let (tokens, _, _) = store();
        tokens.save_auth(&response(3600)).unwrap();

        let mut changed = user();
        changed.role = Role::Admin;
        tokens.update_user(&changed).unwrap();

        assert_eq!(tokens.get_user().map(|u| u.role), Some(Role::Admin));
        assert_eq!(tokens.get_access_token(), Some("access".to_string()));
        assert_eq!(tokens.get_token_expiry(), Some(T0 + 3_600_000));
    }

    #[test]
    fn test_update_user_without_session_is_noop() {
        let (tokens, storage, _) = store();
        tokens.update_user(&user()).unwrap();
        assert!(storage.is_empty());
    }

    // ========================================================================
    // Legacy Keys
    // ========================================================================

    #[test]
    fn test_legacy_keys_are_migrated() {
        let (tokens, storage, _) = store();
        storage.set_item(LEGACY_ACCESS_TOKEN_KEY, "old-access").unwrap();
        storage.set_item(LEGACY_REFRESH_TOKEN_KEY, "old-refresh").unwrap();
        storage
            .set_item(LEGACY_USER_KEY, &serde_json::to_string(&user()).unwrap())
            .unwrap();
        storage
            .set_item(LEGACY_TOKEN_EXPIRY_KEY, &(T0 + 600_000).to_string())
            .unwrap();

        assert_eq!(tokens.get_access_token(), Some("old-access".to_string()));
        assert!(tokens.is_authenticated());

        // Folded into the single record
        assert!(storage.get_item(AUTH_RECORD_KEY).is_some());
        assert_eq!(storage.get_item(LEGACY_ACCESS_TOKEN_KEY), None);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_partial_legacy_keys_are_ignored() {
        let (tokens, storage, _) = store();
        storage.set_item(LEGACY_ACCESS_TOKEN_KEY, "old-access").unwrap();

        assert_eq!(tokens.get_access_token(), None);

        tokens.clear_auth().unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_legacy_expiry_near_min_is_expired() {
        let (tokens, storage, _) = store();
        storage.set_item(LEGACY_ACCESS_TOKEN_KEY, "old-access").unwrap();
        storage.set_item(LEGACY_REFRESH_TOKEN_KEY, "old-refresh").unwrap();
        storage
            .set_item(LEGACY_USER_KEY, &serde_json::to_string(&user()).unwrap())
            .unwrap();
        storage
            .set_item(LEGACY_TOKEN_EXPIRY_KEY, &(i64::MIN + 1).to_string())
            .unwrap();

        assert!(tokens.has_access_token());
        assert!(tokens.is_token_expired());
        assert!(!tokens.is_authenticated());
    }
}
