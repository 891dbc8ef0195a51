//! SQLite-backed record store for todos.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::SqlitePool;

/// Upper bound on pooled connections for file-backed databases.
const MAX_CONNECTIONS: u32 = 5;

/// Create a connection pool from a database URL.
///
/// `store_timeout` bounds both waiting for a pooled connection and waiting
/// on SQLite's write lock; exceeding it surfaces as a `sqlx::Error`.
///
/// In-memory URLs get a single connection that is never recycled, since each
/// SQLite connection would otherwise open its own empty database.
pub async fn create_pool(database_url: &str, store_timeout: Duration) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(store_timeout);

    let pool_options = SqlitePoolOptions::new().acquire_timeout(store_timeout);
    let pool_options = if is_in_memory(database_url) {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        pool_options.max_connections(MAX_CONNECTIONS)
    };

    pool_options.connect_with(options).await
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Nullable columns added to `todo` after its first release.
///
/// Databases written by earlier deployments may already carry some of them,
/// so they are added by name check rather than by a plain migration.
const ADDED_COLUMNS: &[(&str, &str)] = &[("position_x", "REAL"), ("position_y", "REAL")];

/// Apply the embedded migrations under `crates/db/migrations`, then bring an
/// existing `todo` table up to the current column set.
///
/// Safe to run repeatedly and against a `todo` table created outside these
/// migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    upgrade_todo_table(pool).await?;
    Ok(())
}

async fn upgrade_todo_table(pool: &DbPool) -> Result<(), sqlx::Error> {
    let existing: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('todo')")
            .fetch_all(pool)
            .await?;

    for &(column, column_type) in ADDED_COLUMNS {
        if existing.iter().any(|name| name == column) {
            continue;
        }
        tracing::info!(column, "Adding missing column to todo table");
        sqlx::query(&format!("ALTER TABLE todo ADD COLUMN {column} {column_type}"))
            .execute(pool)
            .await?;
    }

    // Older tables declare `completed` without NOT NULL.
    let backfilled = sqlx::query("UPDATE todo SET completed = 0 WHERE completed IS NULL")
        .execute(pool)
        .await?
        .rows_affected();
    if backfilled > 0 {
        tracing::info!(backfilled, "Defaulted null completion flags to false");
    }

    Ok(())
}
