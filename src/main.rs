//! ms-user - a minimal user-account service.
//!
//! Registers accounts with unique usernames and Argon2-hashed passwords,
//! and issues JWT bearer tokens on login.

mod account;
mod api;
mod config;
mod error;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::account::{
    AccountService, Argon2Hasher, JsonAccountStore, SharedAccountStore, StoreError, TokenIssuer,
};
use crate::config::{Config, LogFormat};

/// Initialize the tracing/logging subsystem.
fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => {
            subscriber
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

/// Configure CORS based on the allowed origins.
fn configure_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);

    if origins.len() == 1 && origins[0] == "*" {
        cors = cors.allow_any_origin();
    } else {
        for origin in origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

fn open_json_store(config: &Config) -> Result<SharedAccountStore, StoreError> {
    tracing::info!(path = %config.users_file.display(), "Using JSON account store");
    Ok(Arc::new(JsonAccountStore::new(&config.users_file)?))
}

#[cfg(feature = "postgres")]
async fn open_store(config: &Config) -> Result<SharedAccountStore, StoreError> {
    use crate::account::postgres::{self, PgAccountStore};

    match &config.database_url {
        Some(url) => {
            let pool = postgres::connect(url).await?;
            postgres::run_migrations(&pool).await?;
            tracing::info!("Using PostgreSQL account store");
            Ok(Arc::new(PgAccountStore::new(pool)))
        }
        None => open_json_store(config),
    }
}

#[cfg(not(feature = "postgres"))]
async fn open_store(config: &Config) -> Result<SharedAccountStore, StoreError> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; ignoring it");
    }
    open_json_store(config)
}

/// Graceful shutdown handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

fn invalid_input(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = Config::from_env().map_err(|e| {
        eprintln!("Invalid configuration: {}", e);
        invalid_input(&e)
    })?;

    // Initialize logging
    init_tracing(&config);

    // Validate configuration
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration validation failed");
        return Err(invalid_input(e));
    }

    let store = open_store(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize account store");
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let hasher = Argon2Hasher::with_cost(
        config.hash_memory_kib,
        config.hash_iterations,
        config.hash_parallelism,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Invalid password hashing parameters");
        invalid_input(e)
    })?;

    let service = web::Data::new(AccountService::new(
        store.clone(),
        Arc::new(hasher),
        TokenIssuer::new(config.token.clone()),
    ));
    let store = web::Data::new(store);

    let bind_address = config.bind_address();
    let cors_origins = config.cors_origins.clone();

    tracing::info!(address = %bind_address, "Starting ms-user server");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(configure_cors(&cors_origins))
            // Shared state
            .app_data(service.clone())
            .app_data(store.clone())
            .app_data(api::json_config())
            .configure(api::health::configure)
            .configure(api::accounts::configure)
    })
    .bind(&bind_address)?
    .shutdown_timeout(30)
    .run();

    // Run server with graceful shutdown
    tokio::select! {
        result = server => {
            result
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
    }
}
