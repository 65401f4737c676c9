// Conversation bootstrap and inbox listing.
//
// Only the pieces the matching core needs: a conversation is materialized
// once per match, and the inbox read path consumes the inbox cache
// version. Message delivery and streaming live elsewhere.

pub mod models;
pub mod service;

pub use models::{Conversation, InboxRow};
pub use service::{ChatService, InboxItem, InboxPartner};
