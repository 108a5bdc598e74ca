//! In-process stream provider
//!
//! Feeds tweets pushed from inside the process to every open subscription.
//! Used when no upstream endpoint is configured, and by the test suites to
//! drive the engine deterministically.

use futures::StreamExt;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use super::{RawTweet, StreamError, StreamProvider, TrackFilter, TweetStream};

#[derive(Debug, Clone)]
enum Feed {
    Tweet(RawTweet),
    Disconnect(String),
}

/// Broadcast-backed provider; the track filter is left to the engine
#[derive(Debug, Clone)]
pub struct ChannelProvider {
    tx: broadcast::Sender<Feed>,
}

impl ChannelProvider {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Deliver a tweet to every open subscription
    ///
    /// Returns how many subscriptions received it.
    pub fn push(&self, raw: RawTweet) -> usize {
        self.tx.send(Feed::Tweet(raw)).unwrap_or(0)
    }

    /// Fail every open subscription, as a dropped upstream connection would
    pub fn disconnect(&self, reason: impl Into<String>) -> usize {
        self.tx.send(Feed::Disconnect(reason.into())).unwrap_or(0)
    }

    /// Number of open subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChannelProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

impl StreamProvider for ChannelProvider {
    fn subscribe(&self, _filter: &TrackFilter) -> TweetStream {
        // Subscribe now so tweets pushed before the first poll are not lost.
        let mut rx = self.tx.subscribe();

        let stream = async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(Feed::Tweet(raw)) => yield Ok(raw),
                    Ok(Feed::Disconnect(reason)) => {
                        yield Err(StreamError::Closed(reason));
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("In-process stream lagged, {} tweets dropped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        };

        stream.boxed()
    }

    fn name(&self) -> &str {
        "channel"
    }
}
