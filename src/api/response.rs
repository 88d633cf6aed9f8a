//! JSON response envelope shared by every endpoint.

use actix_web::http::StatusCode;
use serde::Serialize;

/// Response envelope: `{ "code": 201, "info": "success", "data": {...} }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body.
    pub code: u16,
    /// Short human-readable outcome.
    pub info: String,
    /// Payload, omitted when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying a payload.
    pub fn success(status: StatusCode, data: T) -> Self {
        Self {
            code: status.as_u16(),
            info: "success".to_string(),
            data: Some(data),
        }
    }

    /// Response without a payload.
    pub fn message(status: StatusCode, info: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            info: info.into(),
            data: None,
        }
    }

    /// Attach a payload.
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}
