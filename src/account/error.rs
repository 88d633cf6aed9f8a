//! Account error taxonomy.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::hasher::HashingError;
use super::store::StoreError;
use super::token::TokenError;

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Whether the given field failed validation.
    #[cfg(test)]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        Self(fields)
    }
}

/// Errors returned by the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// The candidate failed input validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Another account already uses the username.
    #[error("username already taken")]
    DuplicateUsername,

    /// No account matches the username.
    #[error("user not found")]
    NotFound,

    /// The password does not match the stored hash.
    #[error("wrong password")]
    WrongPassword,

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error("failed to sign token: {0}")]
    Signing(String),

    /// Token signing is not configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Underlying store failure. Not meant for end users.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl From<validator::ValidationErrors> for AccountError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}

impl From<TokenError> for AccountError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingKey | TokenError::InvalidLifetime(_) => {
                Self::Configuration(err.to_string())
            }
            TokenError::Signing(e) => Self::Signing(e.to_string()),
        }
    }
}

/// Result type alias using AccountError.
pub type AccountResult<T> = Result<T, AccountError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use validator::Validate;

    #[test]
    fn test_field_errors_from_validation() {
        let errors = NewAccount::new("", "alice", "")
            .validate()
            .unwrap_err();
        let fields = FieldErrors::from(errors);

        assert!(fields.contains("name"));
        assert!(fields.contains("password"));
        assert!(!fields.contains("username"));
        assert_eq!(
            fields.to_string(),
            "name: name is required; password: password is required"
        );
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let errors = NewAccount::new("Alice", "", "pw").validate().unwrap_err();
        let json = serde_json::to_value(FieldErrors::from(errors)).unwrap();

        assert_eq!(json["username"][0], "username is required");
    }

    #[test]
    fn test_token_error_classification() {
        assert!(matches!(
            AccountError::from(TokenError::MissingKey),
            AccountError::Configuration(_)
        ));
        assert!(matches!(
            AccountError::from(TokenError::InvalidLifetime(100_000_000)),
            AccountError::Configuration(_)
        ));
    }

    #[test]
    fn test_signer_failure_is_signing_error() {
        let encoder_error = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidRsaKey("bad key".to_string()),
        );

        let err = AccountError::from(TokenError::Signing(encoder_error));

        assert!(matches!(err, AccountError::Signing(ref m) if m.contains("bad key")));
    }
}
