//! Moderation engine
//!
//! Owns the single moderation session and serializes every mutation through
//! one async mutex: stream ingestion, human approve/reject/delete, tracking
//! control, the adaptive toggle and reads of the word model by the save timer.
//!
//! Each mutation publishes a full `SessionSnapshot` on the event bus while
//! still holding the lock, so observers see snapshots in mutation order.
//!
//! Item lifecycle:
//! ```text
//! pending ──approve──▶ approved ◀──approve── rejected
//!    │                    │  ▲                  ▲
//!    └──────reject────────┼──┼──────────────────┘
//!                         └reject
//! any live queue ──delete──▶ (gone)
//! ```

mod session;

pub use session::EngineConfig;

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use twmod_common::events::{Author, EventBus, ModerationEvent, SessionSnapshot, Tweet};
use twmod_common::Language;

use crate::classifier::{Classifier, Route};
use crate::error::{Error, Result};
use crate::lexicon::SentimentScorer;
use crate::model::Sign;
use crate::stream::{RawTweet, StreamAdapter, StreamError, StreamProvider, TrackFilter};
use session::{Session, Subscription};

/// Prefix marking a retweet; retweets are never ingested
const RETWEET_PREFIX: &str = "RT";

/// Marker every tracked topic carries
const TOPIC_MARKER: char = '#';

/// The moderation-state engine
pub struct ModerationEngine {
    session: Mutex<Session>,
    classifier: Classifier,
    provider: Arc<dyn StreamProvider>,
    events: EventBus,
    /// Handed to stream pumps so they never keep the engine alive
    this: Weak<ModerationEngine>,
}

impl ModerationEngine {
    pub fn new(
        config: EngineConfig,
        scorer: Arc<dyn SentimentScorer>,
        provider: Arc<dyn StreamProvider>,
        events: EventBus,
    ) -> Arc<Self> {
        info!(
            "Moderation engine created (pending={}, approved={}, rejected={}, learning_rate={}, scorer={}, provider={})",
            config.pending_capacity,
            config.approved_capacity,
            config.rejected_capacity,
            config.learning_rate,
            scorer.name(),
            provider.name()
        );

        Arc::new_cyclic(|this| Self {
            session: Mutex::new(Session::new(&config)),
            classifier: Classifier::new(scorer),
            provider,
            events,
            this: this.clone(),
        })
    }

    /// Event bus carrying session snapshots
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ========================================================================
    // Tracking control
    // ========================================================================

    /// Start tracking `topic`, optionally filtered by `language`
    ///
    /// Already watching is not an error: the current state is returned
    /// unchanged. An unsupported language code means no language filter.
    pub async fn start_tracking(
        &self,
        topic: &str,
        language: Option<&str>,
    ) -> Result<SessionSnapshot> {
        let topic = topic.trim();
        if topic.trim_start_matches(TOPIC_MARKER).is_empty() {
            return Err(Error::InvalidInput("topic must not be empty".to_string()));
        }

        let mut session = self.session.lock().await;
        if session.watching {
            debug!(
                "Already watching {}, ignoring request to track {}",
                session.topic, topic
            );
            return Ok(session.snapshot());
        }

        let resolved = Language::resolve(language);
        if resolved.is_none() {
            if let Some(code) = language.filter(|c| !c.trim().is_empty()) {
                debug!("Ignoring unsupported language filter '{}'", code);
            }
        }

        session.topic = normalize_topic(topic);
        session.language = resolved;
        session.generation += 1;
        let generation = session.generation;

        let stream = self.provider.subscribe(&TrackFilter {
            topic: session.topic.clone(),
            language: resolved,
        });
        let task = StreamAdapter::spawn(self.this.clone(), generation, stream);
        session.subscription = Some(Subscription { generation, task });
        session.watching = true;

        info!(
            "Tracking started: topic={} language={}",
            session.topic,
            resolved.map(|l| l.code()).unwrap_or("any")
        );
        Ok(self.publish(&session))
    }

    /// Stop tracking; queues are left untouched
    pub async fn stop_tracking(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        if session.close_subscription() {
            info!("Tracking stopped: topic={}", session.topic);
        }
        self.publish(&session)
    }

    /// Close any subscription and empty every queue
    ///
    /// Topic, language, adaptive mode and queue shapes survive; ids restart.
    pub async fn clear(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        session.close_subscription();
        session.clear_queues();
        info!("Session cleared (topic={})", session.topic);
        self.publish(&session)
    }

    /// Close any subscription ahead of process exit
    pub async fn shutdown(&self) {
        let mut session = self.session.lock().await;
        if session.close_subscription() {
            info!("Closed upstream subscription for shutdown");
            self.publish(&session);
        }
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Route one raw tweet into the session
    ///
    /// Nothing is ingested unless tracking is active. Retweets and tweets not
    /// mentioning the topic are dropped before they receive an id. Returns the
    /// assigned id.
    pub async fn ingest(&self, raw: RawTweet) -> Option<u64> {
        let mut session = self.session.lock().await;
        if !session.watching {
            debug!("Not tracking, dropping tweet");
            return None;
        }
        self.ingest_locked(&mut session, raw)
    }

    /// Ingestion entry point for the stream pump of subscription `generation`
    ///
    /// Drops the tweet when that subscription has been closed meanwhile.
    pub(crate) async fn ingest_from(&self, generation: u64, raw: RawTweet) -> Option<u64> {
        let mut session = self.session.lock().await;
        if !session.watching || session.generation != generation {
            debug!(generation, "Dropping tweet from closed subscription");
            return None;
        }
        self.ingest_locked(&mut session, raw)
    }

    fn ingest_locked(&self, session: &mut Session, raw: RawTweet) -> Option<u64> {
        let text = raw.full_text().to_string();
        if text.starts_with(RETWEET_PREFIX) {
            debug!("Filtered retweet");
            return None;
        }
        if !text.to_lowercase().contains(&session.topic.to_lowercase()) {
            debug!("Filtered tweet not mentioning {}", session.topic);
            return None;
        }

        session.next_id += 1;
        let tweet = Tweet {
            id: session.next_id,
            text,
            author: Author {
                id: raw.user.id,
                name: raw.user.name,
                screen_name: raw.user.screen_name,
                profile_image_url: raw.user.profile_image_url_https,
            },
            received_at: Utc::now(),
        };

        let id = tweet.id;
        let route = self
            .classifier
            .classify(&tweet.text, session.adaptive_enabled, &session.model);
        if let Some(evicted) = session.queue_mut(route).add(tweet) {
            debug!(id = evicted.id, queue = %route, "Evicted oldest tweet");
        }
        debug!(id, route = %route, "Tweet ingested");

        self.publish(session);
        Some(id)
    }

    /// Called by the stream pump when its subscription ends or fails
    pub(crate) async fn upstream_closed(&self, generation: u64, failure: Option<StreamError>) {
        let mut session = self.session.lock().await;
        if session.generation != generation || !session.watching {
            return;
        }

        match &failure {
            Some(e) => warn!("Upstream stream for {} failed: {}", session.topic, e),
            None => warn!("Upstream stream for {} ended", session.topic),
        }

        // The pump is finishing on its own; drop its handle without aborting.
        session.subscription = None;
        session.generation += 1;
        session.watching = false;
        self.publish(&session);
    }

    // ========================================================================
    // Human actions
    // ========================================================================

    /// Move a pending or rejected tweet to approved and learn from it
    pub async fn approve(&self, id: u64) -> Result<()> {
        self.override_route(id, Route::Approved, &[Route::Pending, Route::Rejected], Sign::Positive)
            .await
    }

    /// Move a pending or approved tweet to rejected and learn from it
    pub async fn reject(&self, id: u64) -> Result<()> {
        self.override_route(id, Route::Rejected, &[Route::Pending, Route::Approved], Sign::Negative)
            .await
    }

    async fn override_route(
        &self,
        id: u64,
        target: Route,
        sources: &[Route],
        sign: Sign,
    ) -> Result<()> {
        let mut session = self.session.lock().await;
        let (source, tweet) = session
            .take_from(sources, id)
            .ok_or(Error::NotFound(id))?;

        session.model.reinforce(&tweet.text, sign);
        if let Some(evicted) = session.queue_mut(target).add(tweet) {
            debug!(id = evicted.id, queue = %target, "Evicted oldest tweet");
        }
        info!(id, from = %source, to = %target, "Tweet moved by moderator");

        self.publish(&session);
        Ok(())
    }

    /// Remove a tweet from whichever queue holds it
    pub async fn delete(&self, id: u64) -> Result<()> {
        let mut session = self.session.lock().await;
        let (source, _tweet) = session
            .take_from(&[Route::Pending, Route::Approved, Route::Rejected], id)
            .ok_or(Error::NotFound(id))?;

        info!(id, from = %source, "Tweet deleted");
        self.publish(&session);
        Ok(())
    }

    /// Toggle adaptive routing
    ///
    /// Switching it on re-classifies every pending tweet once; switching it
    /// off leaves existing placements alone.
    pub async fn set_adaptive(&self, enabled: bool) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        let was_enabled = std::mem::replace(&mut session.adaptive_enabled, enabled);

        if enabled && !was_enabled {
            let backlog = session.pending.drain();
            let mut moved = 0usize;
            for tweet in backlog {
                let route = self.classifier.classify(&tweet.text, true, &session.model);
                if route != Route::Pending {
                    moved += 1;
                }
                if let Some(evicted) = session.queue_mut(route).add(tweet) {
                    debug!(id = evicted.id, queue = %route, "Evicted oldest tweet");
                }
            }
            info!(moved, "Adaptive mode enabled, pending tweets re-evaluated");
        } else if !enabled && was_enabled {
            info!("Adaptive mode disabled");
        }

        self.publish(&session)
    }

    // ========================================================================
    // Observation and persistence hooks
    // ========================================================================

    /// Current session state
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Current state plus a receiver for every later change
    ///
    /// Taken together under the lock, so nothing is missed or seen twice.
    pub async fn subscribe(&self) -> (SessionSnapshot, broadcast::Receiver<ModerationEvent>) {
        let session = self.session.lock().await;
        (session.snapshot(), self.events.subscribe())
    }

    /// Copy of the learned word weights
    pub async fn weights_snapshot(&self) -> HashMap<String, f64> {
        self.session.lock().await.model.snapshot()
    }

    /// Replace the learned word weights (startup load)
    pub async fn load_weights(&self, weights: HashMap<String, f64>) {
        let count = weights.len();
        self.session.lock().await.model.replace(weights);
        info!("Loaded {} word weights", count);
    }

    fn publish(&self, session: &Session) -> SessionSnapshot {
        let snapshot = session.snapshot();
        self.events.emit_lossy(ModerationEvent::Change {
            snapshot: snapshot.clone(),
        });
        snapshot
    }
}

impl std::fmt::Debug for ModerationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationEngine")
            .field("classifier", &self.classifier)
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// Ensure the topic carries the leading marker
fn normalize_topic(topic: &str) -> String {
    if topic.starts_with(TOPIC_MARKER) {
        topic.to_string()
    } else {
        format!("{}{}", TOPIC_MARKER, topic)
    }
}
