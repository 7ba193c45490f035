//! PostgreSQL persistence for segments, memberships and the audit log.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

pub mod error;
pub mod models;
pub mod repositories;

pub use error::StoreError;

pub type DbPool = sqlx::PgPool;

/// Connection and pool sizing parameters.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db_name: String,
    /// One of `disable`, `allow`, `prefer`, `require`, `verify-ca`, `verify-full`.
    pub sslmode: String,
    pub max_conns: u32,
    pub min_conns: u32,
    pub max_conn_lifetime: Duration,
    pub max_conn_idle_time: Duration,
}

impl PoolSettings {
    /// Build connect options. Fails only on an unknown `sslmode`.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        let ssl_mode = PgSslMode::from_str(&self.sslmode)?;
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.db_name)
            .ssl_mode(ssl_mode))
    }
}

/// Create a connection pool sized by `settings`.
pub async fn create_pool(settings: &PoolSettings) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_conns)
        .min_connections(settings.min_conns)
        .max_lifetime(settings.max_conn_lifetime)
        .idle_timeout(settings.max_conn_idle_time)
        .connect_with(settings.connect_options()?)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply the embedded migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
