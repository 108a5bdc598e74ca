//! Stream adapter
//!
//! Pumps one subscription's tweets into the engine's serialized ingestion
//! path, strictly one at a time and in arrival order. When the stream ends or
//! fails the engine is told, so it can drop `watching` and notify observers.

use std::sync::Weak;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use super::TweetStream;
use crate::engine::ModerationEngine;

/// Spawns pump tasks for upstream subscriptions
pub struct StreamAdapter;

impl StreamAdapter {
    /// Start pumping `stream` into `engine` for subscription `generation`
    ///
    /// The task holds only a weak reference, so it never keeps the engine
    /// alive. Aborting the returned handle unsubscribes (the stream is dropped).
    pub fn spawn(
        engine: Weak<ModerationEngine>,
        generation: u64,
        mut stream: TweetStream,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            debug!(generation, "Stream pump started");

            let failure = loop {
                match stream.next().await {
                    Some(Ok(raw)) => {
                        let Some(engine) = engine.upgrade() else {
                            return;
                        };
                        engine.ingest_from(generation, raw).await;
                    }
                    Some(Err(e)) => break Some(e),
                    None => break None,
                }
            };

            // Drop the connection before reporting, so a new subscription never
            // overlaps with this one.
            drop(stream);

            if let Some(engine) = engine.upgrade() {
                engine.upstream_closed(generation, failure).await;
            }
            debug!(generation, "Stream pump finished");
        })
    }
}
