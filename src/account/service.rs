//! Account registration and login.

use std::sync::Arc;
use validator::Validate;

use super::error::{AccountError, AccountResult};
use super::hasher::{CredentialHasher, HashingError};
use super::model::{Account, Credentials, NewAccount};
use super::store::{SharedAccountStore, StoreError};
use super::token::TokenIssuer;

/// Orchestrates the account lifecycle over a store, a hasher and a token issuer.
///
/// Holds no mutable state of its own; clones share the same collaborators.
#[derive(Clone)]
pub struct AccountService {
    store: SharedAccountStore,
    hasher: Arc<dyn CredentialHasher>,
    issuer: Arc<TokenIssuer>,
}

impl AccountService {
    pub fn new(
        store: SharedAccountStore,
        hasher: Arc<dyn CredentialHasher>,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer: Arc::new(issuer),
        }
    }

    /// Run a hasher call on the blocking thread pool, off the request worker.
    async fn run_hasher<T, F>(&self, f: F) -> AccountResult<T>
    where
        F: FnOnce(&dyn CredentialHasher) -> Result<T, HashingError> + Send + 'static,
        T: Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        let result = tokio::task::spawn_blocking(move || f(hasher.as_ref()))
            .await
            .map_err(HashingError::from)?;
        Ok(result?)
    }

    /// Lifetime of issued tokens, in seconds.
    pub fn token_expires_in(&self) -> i64 {
        self.issuer.expires_in()
    }

    /// Register a new account.
    ///
    /// The returned account never carries the password or its hash.
    ///
    /// # Errors
    /// - [`AccountError::Validation`] if any field is empty (checked before the store is touched).
    /// - [`AccountError::DuplicateUsername`] if the username is taken, either by the
    ///   pre-check or by the store's own uniqueness enforcement.
    /// - [`AccountError::Hashing`] or [`AccountError::Store`] on collaborator failure.
    pub async fn register(&self, candidate: NewAccount) -> AccountResult<Account> {
        candidate.validate()?;

        match self.store.get_by_username(&candidate.username).await {
            Ok(_) => return Err(AccountError::DuplicateUsername),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(AccountError::Store(e)),
        }

        let password = candidate.password;
        let password_hash = self.run_hasher(move |h| h.hash(&password)).await?;
        let account = Account::new(candidate.name, candidate.username, password_hash);

        // Two registrations can both pass the pre-check; the store settles it.
        let account = self.store.insert(account).await.map_err(|e| match e {
            StoreError::UniqueViolation(_) => AccountError::DuplicateUsername,
            other => AccountError::Store(other),
        })?;

        tracing::info!(account_id = %account.id, username = %account.username, "Account registered");

        Ok(account.without_password())
    }

    /// Authenticate and return a signed bearer token.
    ///
    /// Every successful call issues an independent token; earlier tokens stay valid.
    pub async fn login(&self, credentials: Credentials) -> AccountResult<String> {
        let account = self
            .store
            .get_by_username(&credentials.username)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AccountError::NotFound,
                other => AccountError::Store(other),
            })?;

        let stored_hash = account.password.clone();
        let plaintext = credentials.password;
        let matched = self
            .run_hasher(move |h| h.verify(&stored_hash, &plaintext))
            .await?;

        if !matched {
            tracing::debug!(account_id = %account.id, "Password mismatch");
            return Err(AccountError::WrongPassword);
        }

        let claim = self.issuer.claim_for(account.id)?;
        let token = self.issuer.issue(&claim)?;

        tracing::info!(account_id = %account.id, token_id = %claim.jti, "Account logged in");

        Ok(token)
    }
}
