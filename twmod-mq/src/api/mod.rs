//! HTTP API for moderators and dashboards

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, run, AppContext};
