// Cache-invalidation scheme for the derived read views (deck, inbox).
//
// Read paths embed a per-user monotonic version counter in their cache
// keys; bumping the counter makes every previously cached entry for that
// user unreachable without explicit eviction. Orphaned entries expire via
// their own short TTL.

pub mod read_cache;
pub mod version;

pub use read_cache::ReadCache;
pub use version::{CacheNamespace, CacheVersionService};
