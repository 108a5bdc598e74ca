//! Periodic word-weight persistence
//!
//! The model is copied through the engine mutex and written to SQLite outside
//! of it, so a slow disk never stalls moderation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::db;
use crate::engine::ModerationEngine;
use crate::error::Result;

/// Load the stored weights, falling back to an empty model on failure
pub async fn load_or_empty(pool: &SqlitePool) -> HashMap<String, f64> {
    match db::load_weights(pool).await {
        Ok(weights) => weights,
        Err(e) => {
            warn!("Failed to load word weights, starting with an empty model: {}", e);
            HashMap::new()
        }
    }
}

/// Save the current weights once
///
/// An empty model is not written, so a fresh process never wipes a stored
/// snapshot it failed to load. Returns the number of rows written.
pub async fn save_now(engine: &ModerationEngine, pool: &SqlitePool) -> Result<usize> {
    let weights = engine.weights_snapshot().await;
    if weights.is_empty() {
        debug!("Word model empty, skipping save");
        return Ok(0);
    }

    let saved = db::save_weights(pool, &weights).await?;
    debug!("Saved {} word weights", saved);
    Ok(saved)
}

/// Spawn the save timer
///
/// Failures are logged and retried on the next tick.
pub fn spawn_save_task(
    engine: Arc<ModerationEngine>,
    pool: SqlitePool,
    interval: Duration,
) -> JoinHandle<()> {
    info!("Word weights saved every {}s", interval.as_secs());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = save_now(&engine, &pool).await {
                warn!("Failed to save word weights: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::lexicon::LexiconScorer;
    use crate::stream::ChannelProvider;
    use sqlx::sqlite::SqlitePoolOptions;
    use twmod_common::events::EventBus;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::init_schema(&pool).await.unwrap();
        pool
    }

    fn engine() -> Arc<ModerationEngine> {
        ModerationEngine::new(
            EngineConfig::default(),
            Arc::new(LexiconScorer::default()),
            Arc::new(ChannelProvider::default()),
            EventBus::new(16),
        )
    }

    #[tokio::test]
    async fn test_empty_model_is_not_saved() {
        let pool = memory_pool().await;
        db::save_weights(&pool, &HashMap::from([("kept".to_string(), 1.0)]))
            .await
            .unwrap();

        assert_eq!(save_now(&engine(), &pool).await.unwrap(), 0);
        assert_eq!(load_or_empty(&pool).await.len(), 1);
    }

    #[tokio::test]
    async fn test_save_now_writes_loaded_weights() {
        let pool = memory_pool().await;
        let engine = engine();
        engine
            .load_weights(HashMap::from([("great".to_string(), 0.2), ("day".to_string(), 0.2)]))
            .await;

        assert_eq!(save_now(&engine, &pool).await.unwrap(), 2);
        let loaded = load_or_empty(&pool).await;
        assert!((loaded["great"] - 0.2).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_load_or_empty_without_table() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        assert!(load_or_empty(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn test_save_task_writes_on_tick() {
        let pool = memory_pool().await;
        let engine = engine();
        engine
            .load_weights(HashMap::from([("tick".to_string(), 0.5)]))
            .await;

        let task = spawn_save_task(engine, pool.clone(), Duration::from_millis(20));
        let mut saved = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if !load_or_empty(&pool).await.is_empty() {
                saved = true;
                break;
            }
        }
        task.abort();

        assert!(saved);
    }
}
