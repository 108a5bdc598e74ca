//! Upstream tweet stream
//!
//! Providers turn a track filter into an asynchronous sequence of raw tweets.
//! The [`adapter`] pumps that sequence into the engine one item at a time.

pub mod adapter;
pub mod channel;
pub mod http;

pub use adapter::StreamAdapter;
pub use channel::ChannelProvider;
pub use http::HttpStreamProvider;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use twmod_common::Language;

/// Upstream stream errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StreamError {
    /// Connection or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    /// Upstream closed the subscription
    #[error("Stream closed: {0}")]
    Closed(String),
}

/// What to track upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFilter {
    pub topic: String,
    pub language: Option<Language>,
}

/// Tweet author as delivered upstream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen_name: String,
    #[serde(default, alias = "profile_image_url")]
    pub profile_image_url_https: Option<String>,
}

/// Untruncated body of a long tweet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedTweet {
    pub full_text: String,
}

/// One item as delivered by the upstream stream
///
/// Control messages (deletes, limit notices) lack `text` and fail to parse,
/// which is how providers skip them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTweet {
    pub text: String,
    #[serde(default)]
    pub extended_tweet: Option<ExtendedTweet>,
    #[serde(default)]
    pub user: RawUser,
}

impl RawTweet {
    /// Minimal tweet, mostly for local feeding and tests
    pub fn new(text: impl Into<String>, screen_name: impl Into<String>) -> Self {
        let screen_name = screen_name.into();
        Self {
            text: text.into(),
            extended_tweet: None,
            user: RawUser {
                id: 0,
                name: screen_name.clone(),
                screen_name,
                profile_image_url_https: None,
            },
        }
    }

    /// Full text, preferring the untruncated body when present
    pub fn full_text(&self) -> &str {
        self.extended_tweet
            .as_ref()
            .map(|e| e.full_text.as_str())
            .unwrap_or(&self.text)
    }
}

/// Sequence of raw tweets for one subscription
pub type TweetStream = BoxStream<'static, Result<RawTweet, StreamError>>;

/// Source of live tweets
///
/// `subscribe` must not block: connecting happens when the returned stream is
/// first polled. Dropping the stream unsubscribes.
pub trait StreamProvider: Send + Sync {
    fn subscribe(&self, filter: &TrackFilter) -> TweetStream;

    /// Provider name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_tweet_parses_upstream_shape() {
        let json = r#"{
            "id": 1234567890123,
            "text": "short #rust",
            "extended_tweet": { "full_text": "the long version #rust" },
            "user": {
                "id": 42,
                "name": "Ferris",
                "screen_name": "ferris",
                "profile_image_url_https": "https://img.example/ferris.png"
            }
        }"#;

        let raw: RawTweet = serde_json::from_str(json).unwrap();
        assert_eq!(raw.full_text(), "the long version #rust");
        assert_eq!(raw.user.id, 42);
        assert_eq!(
            raw.user.profile_image_url_https.as_deref(),
            Some("https://img.example/ferris.png")
        );
    }

    #[test]
    fn test_control_messages_do_not_parse() {
        let delete = r#"{"delete":{"status":{"id":1,"user_id":2}}}"#;
        assert!(serde_json::from_str::<RawTweet>(delete).is_err());
    }

    #[test]
    fn test_missing_user_defaults() {
        let raw: RawTweet = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(raw.full_text(), "hi");
        assert_eq!(raw.user, RawUser::default());
    }
}
