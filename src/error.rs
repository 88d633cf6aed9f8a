//! Application error types and handling.
//!
//! Maps account errors onto HTTP responses without leaking internal detail.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::account::{AccountError, FieldErrors};
use crate::api::response::ApiResponse;

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("{0}")]
    Unauthorized(String),

    /// Validation error.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Bad request.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error. The message is always generic.
    #[error("internal server error")]
    Internal,
}

impl AppError {
    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Create an unauthorized error for invalid credentials.
    ///
    /// Unknown usernames and wrong passwords share this message.
    pub fn invalid_credentials() -> Self {
        Self::Unauthorized("invalid username or password".to_string())
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(fields) => Self::Validation(fields),
            AccountError::DuplicateUsername => Self::Conflict(err.to_string()),
            AccountError::NotFound | AccountError::WrongPassword => {
                tracing::debug!(reason = %err, "Login rejected");
                Self::invalid_credentials()
            }
            AccountError::Hashing(_)
            | AccountError::Signing(_)
            | AccountError::Configuration(_)
            | AccountError::Store(_) => {
                tracing::error!(error = %err, "Account operation failed");
                Self::Internal
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let response = ApiResponse::message(status, self.to_string());

        tracing::info!(
            error_code = %self.error_code(),
            status = %status.as_u16(),
            "API error"
        );

        match self {
            Self::Validation(fields) => HttpResponse::build(status).json(response.with_data(fields)),
            _ => HttpResponse::build(status).json(response),
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::StoreError;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::invalid_credentials().error_code(), "UNAUTHORIZED");
        assert_eq!(AppError::Conflict("test".into()).error_code(), "CONFLICT");
        assert_eq!(AppError::Internal.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::from(AccountError::DuplicateUsername).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(AccountError::WrongPassword).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AccountError::Validation(FieldErrors::default())).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(AccountError::Configuration("missing key".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unknown_user_and_wrong_password_look_alike() {
        let not_found = AppError::from(AccountError::NotFound).to_string();
        let wrong = AppError::from(AccountError::WrongPassword).to_string();

        assert_eq!(not_found, wrong);
    }

    #[test]
    fn test_store_detail_is_not_exposed() {
        let err = AccountError::Store(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/var/lib/ms-user/users.json: permission denied",
        )));

        let message = AppError::from(err).to_string();

        assert_eq!(message, "internal server error");
    }
}
