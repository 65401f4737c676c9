pub mod conversation;

pub use conversation::{Conversation, InboxRow};
