//! Cache module for keeping the poem of the day on disk
//!
//! This module provides a daily cache that stores one poem per calendar day in
//! a key-value store. Records from another day, and records that cannot be
//! read, are treated as a cache miss rather than an error.

mod daily;
mod store;

pub use daily::{today, CacheError, DailyCache, CACHE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
