//! Process-local caches with explicit staleness.
//!
//! Reads return [`CacheRead<T>`], which carries when the value was cached so
//! callers can tell a fresh hit from a stale fallback.

pub mod freshness;
pub mod single_slot;

pub use freshness::CacheRead;
pub use single_slot::SingleSlotCache;
