// CourtMatch - API Core
//
// This crate provides the backend matching core for a swipe-based
// partner-finding app: candidate ranking, opaque time-boxed decks,
// idempotent decision processing with mutual-match formation, and
// version-counter cache invalidation for the deck and inbox read paths.

pub mod cache;
pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
