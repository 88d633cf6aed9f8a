//! Account data model.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// A registered account.
///
/// `password` holds the password hash once persisted. It is cleared before an
/// account is handed back to a caller, and skipped during serialization when
/// empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID, assigned once at registration.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Username (unique, case-sensitive).
    pub username: String,
    /// Password hash.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl Account {
    /// Create a new account with a freshly generated ID.
    pub fn new(name: String, username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            username,
            password: password_hash,
        }
    }

    /// Drop the stored hash so the account can leave the service.
    pub fn without_password(mut self) -> Self {
        self.password.clear();
        self
    }

    /// Convert to a public representation (without sensitive data).
    pub fn to_public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Public account representation (safe to expose via API).
#[derive(Debug, Clone, Serialize)]
pub struct PublicAccount {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

/// Registration candidate, carrying the plaintext password.
///
/// Missing fields deserialize as empty strings so they are reported as
/// validation errors rather than malformed payloads.
#[derive(Clone, Default, Deserialize, Validate)]
pub struct NewAccount {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl NewAccount {
    #[cfg(test)]
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login credentials.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    #[cfg(test)]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let candidate = NewAccount::new("Alice", "alice", "secret123");
        let account = Account::new("Alice".into(), "alice".into(), "$argon2id$hash".into());
        let credentials = Credentials::new("alice", "secret123");

        for output in [
            format!("{:?}", candidate),
            format!("{:?}", account),
            format!("{:?}", credentials),
        ] {
            assert!(!output.contains("secret123"));
            assert!(!output.contains("$argon2id$hash"));
            assert!(output.contains("[REDACTED]"));
        }
    }

    #[test]
    fn test_cleared_password_is_not_serialized() {
        let account = Account::new("Alice".into(), "alice".into(), "hash".into());
        let json = serde_json::to_value(account.without_password()).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_missing_fields_fail_validation() {
        let candidate: NewAccount = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        let errors = candidate.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("username"));
    }
}
