//! Id aliases for domain entities.
//!
//! Identity resolution hands the core a stable integer user id; every
//! persisted entity keys off BIGSERIAL ids of the same width.

/// Id of a user profile (also the actor/target id in decisions).
pub type UserId = i64;

/// Id of a recorded decision row.
pub type ActionId = i64;

/// Id of a mutual match.
pub type MatchId = i64;

/// Id of a conversation attached to a match.
pub type ConversationId = i64;
