pub mod location;
pub mod preference;
pub mod profile;

pub use location::UserLocation;
pub use preference::{Game, PartnerGender, Preference, SessionType};
pub use profile::{Gender, SkillLevel, UserProfile};
