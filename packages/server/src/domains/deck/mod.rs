// Deck issuance: candidate ranking, defensive filtering, opaque
// session-scoped card ids and the deck assembly service.

pub mod filter;
pub mod ranking;
pub mod service;
pub mod session;

pub use filter::FilterResult;
pub use ranking::CandidateRow;
pub use service::{Deck, DeckCard, DeckService};
pub use session::{DeckSession, DeckSessionStore};
