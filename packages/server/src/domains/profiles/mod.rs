// Profile, preference and location read models.
//
// The matching core only reads these (plus the preference upsert, which
// has to bump the owner's deck version); profile editing, photos and
// onboarding live elsewhere.

pub mod models;

pub use models::*;
