pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Error;

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};

use crate::settings::DatabaseSettings;

pub async fn establish_connection(settings: &DatabaseSettings) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(&settings.url)?
        .create_if_missing(settings.create_if_missing)
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Replaces categories and questions in one transaction; nothing is kept if either step fails.
pub async fn import_catalog(
    pool: &SqlitePool,
    categories: Vec<Category>,
    questions: Vec<Question>,
) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    queries::categories::import_categories(&mut *tx, categories).await?;
    queries::questions::import_questions(&mut *tx, questions).await?;
    tx.commit().await
}

/// Single-connection in-memory database with the schema and seed data applied.
///
/// The connection never expires, otherwise the database would vanish with it.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
