// Common types and utilities shared across the application

pub mod errors;
pub mod redis;
pub mod types;

pub use errors::ApiError;
pub use redis::init_redis;
pub use types::*;
