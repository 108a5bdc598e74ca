//! # twmod Common Library
//!
//! Shared code for the twmod moderation service and its consumers:
//! - Snapshot and event types (`ModerationEvent`, `SessionSnapshot`)
//! - The broadcast `EventBus`
//! - Supported stream languages
//! - Bootstrap configuration loading and root folder resolution

pub mod config;
pub mod error;
pub mod events;
pub mod language;

pub use error::{Error, Result};
pub use language::Language;
