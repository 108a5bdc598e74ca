//! SQLite storage for the learned word weights
//!
//! Only the word-weight snapshot is durable. Tweets and queue contents live
//! in memory for the lifetime of the process.

use std::collections::HashMap;
use std::path::Path;

use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use tracing::info;

use crate::error::Result;

/// Open (creating if needed) the database at `db_path` and ensure the schema
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(twmod_common::Error::from)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Create the weight table if missing (idempotent)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS word_weights (
            token TEXT PRIMARY KEY NOT NULL,
            weight REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Read the whole weight snapshot
pub async fn load_weights(pool: &SqlitePool) -> Result<HashMap<String, f64>> {
    let rows = sqlx::query("SELECT token, weight FROM word_weights")
        .fetch_all(pool)
        .await?;

    let mut weights = HashMap::with_capacity(rows.len());
    for row in rows {
        let token: String = row.get("token");
        let weight: f64 = row.get("weight");
        weights.insert(token, weight);
    }

    Ok(weights)
}

/// Replace the stored snapshot with `weights` in one transaction
///
/// Returns the number of rows written.
pub async fn save_weights(pool: &SqlitePool, weights: &HashMap<String, f64>) -> Result<usize> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM word_weights")
        .execute(&mut *tx)
        .await?;

    for (token, weight) in weights {
        sqlx::query("INSERT INTO word_weights (token, weight) VALUES (?, ?)")
            .bind(token)
            .bind(weight)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(weights.len())
}
