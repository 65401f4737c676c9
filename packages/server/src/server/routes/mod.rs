// HTTP routes
pub mod conversations;
pub mod deck;
pub mod decisions;
pub mod health;
pub mod preferences;

pub use conversations::*;
pub use deck::*;
pub use decisions::*;
pub use health::*;
pub use preferences::*;
