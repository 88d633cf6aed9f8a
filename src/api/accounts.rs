//! Account API endpoints.

use actix_web::{http::StatusCode, post, web, HttpResponse};
use serde::Serialize;

use crate::account::{AccountService, Credentials, NewAccount};
use crate::api::response::ApiResponse;
use crate::error::AppResult;

/// Bearer token returned on login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (always "Bearer").
    pub token_type: &'static str,
    /// Expiration time in seconds.
    pub expires_in: i64,
}

/// Register a new account.
///
/// POST /users
#[post("")]
pub async fn register(
    service: web::Data<AccountService>,
    body: web::Json<NewAccount>,
) -> AppResult<HttpResponse> {
    let account = service.register(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        StatusCode::CREATED,
        account.to_public(),
    )))
}

/// Login with username and password.
///
/// POST /users/login
#[post("/login")]
pub async fn login(
    service: web::Data<AccountService>,
    body: web::Json<Credentials>,
) -> AppResult<HttpResponse> {
    let access_token = service.login(body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StatusCode::OK,
        TokenResponse {
            access_token,
            token_type: "Bearer",
            expires_in: service.token_expires_in(),
        },
    )))
}

/// Configure account routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/users").service(register).service(login));
}
