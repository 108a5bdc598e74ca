//! twmod-mq - live tweet moderation queue service
//!
//! Tracks one hashtag on an upstream tweet stream and routes every matching
//! tweet into a pending, approved or rejected review queue. Moderators move
//! tweets between queues over HTTP; with adaptive mode on, a lexicon scorer
//! backed by an online word-weight model routes tweets automatically and
//! learns from every moderator override.
//!
//! Component map:
//! - [`queue`]: fixed-capacity review queues
//! - [`model`]: tokenizer and online word-weight model
//! - [`lexicon`], [`classifier`]: two-stage routing
//! - [`engine`]: the serialized moderation session
//! - [`stream`]: upstream providers and the ingestion pump
//! - [`db`], [`persistence`]: SQLite weight snapshots
//! - [`api`]: axum routes and SSE

pub mod api;
pub mod classifier;
pub mod db;
pub mod engine;
pub mod error;
pub mod lexicon;
pub mod model;
pub mod persistence;
pub mod queue;
pub mod stream;

pub use engine::{EngineConfig, ModerationEngine};
pub use error::{Error, Result};
