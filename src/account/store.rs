//! Account storage.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::model::Account;

/// Account store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("account not found")]
    NotFound,

    /// An account with the same username already exists.
    #[error("username '{0}' already exists")]
    UniqueViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "postgres")]
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistence for account records.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account.
    ///
    /// Fails with [`StoreError::UniqueViolation`] if the username is taken.
    async fn insert(&self, account: Account) -> Result<Account, StoreError>;

    /// Find an account by exact username.
    ///
    /// Fails with [`StoreError::NotFound`] if no account matches.
    async fn get_by_username(&self, username: &str) -> Result<Account, StoreError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Thread-safe handle to an account store.
pub type SharedAccountStore = Arc<dyn AccountStore>;

/// Account storage format for JSON file.
#[derive(Debug, Serialize, Deserialize, Default)]
struct AccountFile {
    users: Vec<Account>,
}

/// JSON file-based account store.
#[derive(Debug)]
pub struct JsonAccountStore {
    file_path: PathBuf,
    /// In-memory cache keyed by username.
    cache: RwLock<HashMap<String, Account>>,
}

impl JsonAccountStore {
    /// Open a store backed by the given file, loading existing accounts.
    pub fn new(file_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self {
            file_path: file_path.as_ref().to_path_buf(),
            cache: RwLock::new(HashMap::new()),
        };

        store.load()?;

        Ok(store)
    }

    /// Load accounts from file into cache.
    fn load(&self) -> Result<(), StoreError> {
        if !self.file_path.exists() {
            tracing::info!(path = %self.file_path.display(), "Users file not found, starting fresh");
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.file_path)?;
        let file: AccountFile = serde_json::from_str(&content)?;

        let mut cache = self.cache.write();
        cache.clear();
        for account in file.users {
            cache.insert(account.username.clone(), account);
        }

        tracing::info!(count = cache.len(), "Loaded accounts from file");
        Ok(())
    }

    /// Write the given accounts to file.
    ///
    /// Called with the cache write lock held so saves never interleave.
    fn save(&self, accounts: &HashMap<String, Account>) -> Result<(), StoreError> {
        let file = AccountFile {
            users: accounts.values().cloned().collect(),
        };

        let content = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write atomically using temp file
        let temp_path = self.file_path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)?;
        std::fs::rename(&temp_path, &self.file_path)?;

        tracing::debug!(path = %self.file_path.display(), count = accounts.len(), "Saved accounts to file");
        Ok(())
    }
}

#[async_trait]
impl AccountStore for JsonAccountStore {
    async fn insert(&self, account: Account) -> Result<Account, StoreError> {
        let mut cache = self.cache.write();

        if cache.contains_key(&account.username) {
            return Err(StoreError::UniqueViolation(account.username));
        }

        cache.insert(account.username.clone(), account.clone());

        if let Err(e) = self.save(&cache) {
            cache.remove(&account.username);
            return Err(e);
        }

        tracing::info!(account_id = %account.id, username = %account.username, "Stored new account");
        Ok(account)
    }

    async fn get_by_username(&self, username: &str) -> Result<Account, StoreError> {
        let cache = self.cache.read();
        cache.get(username).cloned().ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
                Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("data directory {} is missing", parent.display()),
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn create_test_store() -> (TempDir, JsonAccountStore) {
        let dir = tempdir().unwrap();
        let store = JsonAccountStore::new(dir.path().join("users.json")).unwrap();
        (dir, store)
    }

    fn account(username: &str) -> Account {
        Account::new("Test".to_string(), username.to_string(), "hash".to_string())
    }

    #[actix_rt::test]
    async fn test_insert_and_get() {
        let (_dir, store) = create_test_store();

        let created = store.insert(account("testuser")).await.unwrap();
        let found = store.get_by_username("testuser").await.unwrap();

        assert_eq!(found, created);
    }

    #[actix_rt::test]
    async fn test_missing_username() {
        let (_dir, store) = create_test_store();

        let result = store.get_by_username("nobody").await;

        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[actix_rt::test]
    async fn test_duplicate_username() {
        let (_dir, store) = create_test_store();

        store.insert(account("testuser")).await.unwrap();
        let result = store.insert(account("testuser")).await;

        assert!(matches!(result, Err(StoreError::UniqueViolation(u)) if u == "testuser"));
    }

    #[actix_rt::test]
    async fn test_username_is_case_sensitive() {
        let (_dir, store) = create_test_store();
        store.insert(account("TestUser")).await.unwrap();

        assert!(store.get_by_username("TestUser").await.is_ok());
        assert!(matches!(
            store.get_by_username("testuser").await,
            Err(StoreError::NotFound)
        ));
        assert!(store.insert(account("testuser")).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_accounts_survive_reload() {
        let (dir, store) = create_test_store();
        let created = store.insert(account("testuser")).await.unwrap();
        drop(store);

        let reopened = JsonAccountStore::new(dir.path().join("users.json")).unwrap();
        let found = reopened.get_by_username("testuser").await.unwrap();

        assert_eq!(found.id, created.id);
        assert_eq!(found.password, "hash");
    }

    #[actix_rt::test]
    async fn test_ping() {
        let (dir, store) = create_test_store();
        assert!(store.ping().await.is_ok());

        let missing = JsonAccountStore::new(dir.path().join("gone").join("users.json")).unwrap();
        assert!(missing.ping().await.is_err());
    }
}
