//! HTTP API.

pub mod accounts;
pub mod health;
pub mod response;

use actix_web::web;

use crate::error::AppError;

/// JSON extractor configuration: malformed bodies become `400 parse error`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Failed to parse JSON payload");
        AppError::BadRequest("parse error".to_string()).into()
    })
}
