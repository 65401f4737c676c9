// Identity resolution: verifies bearer tokens and yields a stable user id.

pub mod jwt;

pub use jwt::{Claims, JwtService};
