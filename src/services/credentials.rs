use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::db::Database;
use crate::models::User;
use crate::services::crypto::CryptoService;

const TOKEN_KEY: &str = "auth_token";
const USER_KEY: &str = "user";

/// The only durable per-user state: the sealed bearer token and the cached profile.
pub struct CredentialStore {
    db: Arc<Mutex<Database>>,
    use_keychain: AtomicBool,
    unsealed: RwLock<Option<String>>,
}

impl CredentialStore {
    pub fn new(db: Arc<Mutex<Database>>, use_keychain: bool) -> Self {
        CredentialStore {
            db,
            use_keychain: AtomicBool::new(use_keychain),
            unsealed: RwLock::new(None),
        }
    }

    pub fn uses_keychain(&self) -> bool {
        self.use_keychain.load(Ordering::SeqCst)
    }

    /// Where the next `save` seals the token. An already stored token stays where it is.
    pub fn set_use_keychain(&self, enabled: bool) {
        self.use_keychain.store(enabled, Ordering::SeqCst);
    }

    pub fn save(&self, token: &str, user: &User) -> Result<()> {
        let sealed = CryptoService::seal(token, TOKEN_KEY, self.uses_keychain())?;
        let user_json = serde_json::to_string(user)?;
        {
            let db = self.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
            db.set_setting(TOKEN_KEY, &sealed)?;
            db.set_setting(USER_KEY, &user_json)?;
        }
        *self.unsealed.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        if let Some(token) = self.unsealed.read().unwrap_or_else(PoisonError::into_inner).clone() {
            return Some(token);
        }
        let stored = {
            let db = self.db.lock().ok()?;
            db.get_setting(TOKEN_KEY).ok().flatten()?
        };
        match CryptoService::unseal(&stored) {
            Ok(token) => {
                *self.unsealed.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
                Some(token)
            }
            Err(err) => {
                tracing::warn!("stored token is unreadable, ignoring it: {}", err);
                None
            }
        }
    }

    pub fn user(&self) -> Option<User> {
        let raw = {
            let db = self.db.lock().ok()?;
            db.get_setting(USER_KEY).ok().flatten()?
        };
        serde_json::from_str(&raw)
            .map_err(|err| tracing::warn!("cached user is malformed: {}", err))
            .ok()
    }

    pub fn clear(&self) -> Result<()> {
        *self.unsealed.write().unwrap_or_else(PoisonError::into_inner) = None;
        let db = self.db.lock().map_err(|_| anyhow!("DB lock poisoned"))?;
        if let Some(stored) = db.get_setting(TOKEN_KEY)? {
            if let Err(err) = CryptoService::forget(&stored) {
                tracing::warn!("could not remove keychain entry: {}", err);
            }
        }
        db.delete_setting(TOKEN_KEY)?;
        db.delete_setting(USER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Arc<Mutex<Database>>, CredentialStore) {
        let db = Arc::new(Mutex::new(Database::in_memory().unwrap()));
        let creds = CredentialStore::new(db.clone(), false);
        (db, creds)
    }

    fn user() -> User {
        User {
            id: 12,
            email: "kladovshik@example.com".to_string(),
            full_name: "Анна Петрова".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn saved_session_is_restored_and_token_is_not_plaintext() {
        let (db, creds) = store();
        creds.save("jwt-token-value", &user()).unwrap();

        assert_eq!(creds.token().as_deref(), Some("jwt-token-value"));
        assert_eq!(creds.user(), Some(user()));

        let raw = db.lock().unwrap().get_setting("auth_token").unwrap().unwrap();
        assert!(!raw.contains("jwt-token-value"));
    }

    #[test]
    fn clear_removes_token_and_user() {
        let (_db, creds) = store();
        creds.save("jwt-token-value", &user()).unwrap();
        creds.clear().unwrap();
        assert_eq!(creds.token(), None);
        assert_eq!(creds.user(), None);
    }

    #[test]
    fn token_follows_save_and_clear_without_reading_the_database() {
        let (db, creds) = store();
        creds.save("jwt-first", &user()).unwrap();
        assert_eq!(creds.token().as_deref(), Some("jwt-first"));

        db.lock().unwrap().set_setting("auth_token", "enc:zz:zz:zz").unwrap();
        assert_eq!(creds.token().as_deref(), Some("jwt-first"));

        creds.save("jwt-second", &user()).unwrap();
        assert_eq!(creds.token().as_deref(), Some("jwt-second"));

        creds.clear().unwrap();
        assert_eq!(creds.token(), None);
        assert_eq!(creds.token(), None);
    }

    #[test]
    fn persisted_token_is_unsealed_by_a_fresh_store() {
        let (db, creds) = store();
        creds.save("jwt-restored", &user()).unwrap();

        let reopened = CredentialStore::new(db, false);
        assert_eq!(reopened.token().as_deref(), Some("jwt-restored"));
    }

    #[test]
    fn keychain_switch_applies_to_the_next_save() {
        let db = Arc::new(Mutex::new(Database::in_memory().unwrap()));
        let creds = CredentialStore::new(db.clone(), true);
        assert!(creds.uses_keychain());
        creds.set_use_keychain(false);
        assert!(!creds.uses_keychain());

        creds.save("jwt-local", &user()).unwrap();
        let raw = db.lock().unwrap().get_setting("auth_token").unwrap().unwrap();
        assert!(raw.starts_with("enc:"));
        assert_eq!(creds.token().as_deref(), Some("jwt-local"));
    }

    #[test]
    fn garbage_token_reads_as_absent() {
        let (db, creds) = store();
        db.lock().unwrap().set_setting("auth_token", "enc:zz:zz:zz").unwrap();
        assert_eq!(creds.token(), None);
    }
}
