//! PostgreSQL-backed account store.

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

use super::model::Account;
use super::store::{AccountStore, StoreError};

const MAX_CONNECTIONS: u32 = 10;
const MIN_CONNECTIONS: u32 = 5;
const MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);
const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create the connection pool.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(MIN_CONNECTIONS)
        .max_lifetime(MAX_LIFETIME)
        .idle_timeout(IDLE_TIMEOUT)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Apply embedded migrations. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations are up to date");
    Ok(())
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    username: String,
    password: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            username: row.username,
            password: row.password,
        }
    }
}

/// Account store on a `users` table with a unique index on `username`.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: Account) -> Result<Account, StoreError> {
        sqlx::query("INSERT INTO users (id, name, username, password) VALUES ($1, $2, $3, $4)")
            .bind(account.id)
            .bind(&account.name)
            .bind(&account.username)
            .bind(&account.password)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let unique_violation = e
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation());
                if unique_violation {
                    StoreError::UniqueViolation(account.username.clone())
                } else {
                    tracing::error!(error = %e, "Failed to insert account");
                    StoreError::Database(e)
                }
            })?;

        Ok(account)
    }

    async fn get_by_username(&self, username: &str) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, name, username, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to look up account");
            StoreError::Database(e)
        })?;

        row.map(Account::from).ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
