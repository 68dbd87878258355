//! In-memory cache for API responses
//!
//! The cache stores serialized payloads with a per-entry expiry so a single
//! instance can serve every endpoint (single records, lists of records, id lists,
//! birthdays). Expired entries are evicted lazily when they are looked up.

mod store;

pub use store::{CacheError, LocalCache};
