// Decision recording and mutual-match formation.

pub mod models;
pub mod processor;

pub use models::{Decision, Match, UserAction};
pub use processor::{DecisionError, DecisionOutcome, DecisionProcessor};
