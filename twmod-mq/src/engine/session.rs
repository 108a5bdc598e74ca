//! Moderation session aggregate
//!
//! Plain data guarded by the engine's mutex. Nothing here is async and nothing
//! here broadcasts; the engine owns both concerns.

use tokio::task::JoinHandle;
use tracing::debug;
use twmod_common::events::{SessionSnapshot, Tweet};
use twmod_common::Language;

use crate::classifier::Route;
use crate::model::WordWeightModel;
use crate::queue::{BoundedQueue, Orientation};

/// Queue capacities and learning rate for a session
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub pending_capacity: usize,
    pub approved_capacity: usize,
    pub rejected_capacity: usize,
    pub learning_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pending_capacity: 10,
            approved_capacity: 50,
            rejected_capacity: 50,
            learning_rate: crate::model::DEFAULT_LEARNING_RATE,
        }
    }
}

impl From<&twmod_common::config::TomlConfig> for EngineConfig {
    fn from(config: &twmod_common::config::TomlConfig) -> Self {
        Self {
            pending_capacity: config.queues.pending_capacity,
            approved_capacity: config.queues.approved_capacity,
            rejected_capacity: config.queues.rejected_capacity,
            learning_rate: config.learning.learning_rate,
        }
    }
}

/// Open upstream subscription
#[derive(Debug)]
pub(crate) struct Subscription {
    pub generation: u64,
    pub task: JoinHandle<()>,
}

/// The single moderation session of the process
#[derive(Debug)]
pub(crate) struct Session {
    pub topic: String,
    pub language: Option<Language>,
    pub watching: bool,
    pub adaptive_enabled: bool,
    pub pending: BoundedQueue<Tweet>,
    pub approved: BoundedQueue<Tweet>,
    pub rejected: BoundedQueue<Tweet>,
    pub next_id: u64,
    pub model: WordWeightModel,
    pub subscription: Option<Subscription>,
    /// Bumped on every open and close; stale pumps compare against it
    pub generation: u64,
}

impl Session {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            topic: String::new(),
            language: None,
            watching: false,
            adaptive_enabled: false,
            pending: BoundedQueue::new(config.pending_capacity, Orientation::Fifo),
            approved: BoundedQueue::new(config.approved_capacity, Orientation::NewestFirst),
            rejected: BoundedQueue::new(config.rejected_capacity, Orientation::NewestFirst),
            next_id: 0,
            model: WordWeightModel::new(config.learning_rate),
            subscription: None,
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            topic: self.topic.clone(),
            language: self.language,
            watching: self.watching,
            adaptive_enabled: self.adaptive_enabled,
            pending: self.pending.snapshot(),
            approved: self.approved.snapshot(),
            rejected: self.rejected.snapshot(),
        }
    }

    pub fn queue_mut(&mut self, route: Route) -> &mut BoundedQueue<Tweet> {
        match route {
            Route::Pending => &mut self.pending,
            Route::Approved => &mut self.approved,
            Route::Rejected => &mut self.rejected,
        }
    }

    /// Remove `id` from the first of `routes` that holds it
    pub fn take_from(&mut self, routes: &[Route], id: u64) -> Option<(Route, Tweet)> {
        routes
            .iter()
            .find_map(|route| self.queue_mut(*route).remove_by_id(id).map(|t| (*route, t)))
    }

    /// Close the upstream subscription, if any
    ///
    /// Once this returns, the old pump can no longer ingest: its generation is
    /// stale and its task is aborted. Returns whether tracking was active.
    pub fn close_subscription(&mut self) -> bool {
        self.generation += 1;
        if let Some(subscription) = self.subscription.take() {
            subscription.task.abort();
            debug!(generation = subscription.generation, "Upstream subscription closed");
        }
        std::mem::replace(&mut self.watching, false)
    }

    pub fn clear_queues(&mut self) {
        self.pending.clear();
        self.approved.clear();
        self.rejected.clear();
        self.next_id = 0;
    }
}
