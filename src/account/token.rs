//! JWT token issuance.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject tag carried by every issued token.
pub const TOKEN_SUBJECT: &str = "auth token";

/// Token issuance errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT signing key is not configured")]
    MissingKey,

    /// The configured lifetime does not fit a timestamp.
    #[error("token lifetime of {0} days is out of range")]
    InvalidLifetime(i64),

    #[error("failed to encode JWT: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signing configuration for the token issuer.
#[derive(Clone)]
pub struct TokenSettings {
    /// HS256 secret. `None` or empty disables issuance.
    pub secret: Option<String>,
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Token lifetime in days.
    pub expiry_days: i64,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("issuer", &self.issuer)
            .field("expiry_days", &self.expiry_days)
            .finish()
    }
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Issuer tag.
    pub iss: String,
    /// Subject tag.
    pub sub: String,
    /// Unique claim ID.
    pub jti: Uuid,
    /// Account the token was issued for.
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl IdentityClaim {
    /// Create new claims for an account.
    pub fn new(user_id: Uuid, issuer: String, expiry_days: i64) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = TimeDelta::try_days(expiry_days)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenError::InvalidLifetime(expiry_days))?;

        Ok(Self {
            iss: issuer,
            sub: TOKEN_SUBJECT.to_string(),
            jti: Uuid::new_v4(),
            user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

/// Signs identity claims into bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    settings: TokenSettings,
}

impl TokenIssuer {
    pub fn new(settings: TokenSettings) -> Self {
        Self { settings }
    }

    /// Token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.settings.expiry_days.saturating_mul(24 * 60 * 60)
    }

    /// Build a fresh claim for the given account.
    pub fn claim_for(&self, user_id: Uuid) -> Result<IdentityClaim, TokenError> {
        IdentityClaim::new(user_id, self.settings.issuer.clone(), self.settings.expiry_days)
    }

    /// Sign a claim as an HS256 JWT.
    pub fn issue(&self, claim: &IdentityClaim) -> Result<String, TokenError> {
        let secret = self
            .settings
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingKey)?;

        let key = EncodingKey::from_secret(secret.as_bytes());
        Ok(encode(&Header::default(), claim, &key)?)
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> TokenSettings {
    TokenSettings {
        secret: Some("test-secret-key-for-testing-purposes-only".to_string()),
        issuer: "ms-user".to_string(),
        expiry_days: 7,
    }
}
