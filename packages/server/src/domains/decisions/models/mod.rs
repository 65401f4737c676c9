pub mod matches;
pub mod user_action;

pub use matches::Match;
pub use user_action::{Decision, UserAction};
