//! Daily cache for the poem of the day
//!
//! Stores a single record, `{"date": "YYYY-MM-DD", "poetry": ...}`, under a
//! fixed key. A record is only handed back on the local calendar day it was
//! written; anything else (missing, unparseable, another day) reads as a miss.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::store::{KeyValueStore, StoreError};
use crate::poetry::Poem;

/// Storage key for the cached poem
pub const CACHE_KEY: &str = "dailypoetry_cache";

/// Failures inside the cache
///
/// These never reach the service's callers: `read` treats them as a miss and
/// `write` logs and drops them.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store could not be read
    #[error("failed to read cache record: {0}")]
    Read(#[source] StoreError),

    /// The stored record could not be parsed
    #[error("malformed cache record: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The store could not be written
    #[error("failed to write cache record: {0}")]
    Write(#[source] StoreError),
}

/// Record persisted in the store
#[derive(Debug, Serialize, Deserialize)]
struct CachedRecord<T> {
    /// Local date the poem was fetched
    date: NaiveDate,
    /// The poem payload
    poetry: T,
}

/// Today's local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Caches one poem per calendar day in a key-value store
#[derive(Clone)]
pub struct DailyCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for DailyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyCache").field("key", &self.key).finish()
    }
}

impl DailyCache {
    /// Creates a cache over the given store using the default key
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Creates a cache over a store that is shared with other owners
    pub fn from_shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: CACHE_KEY.to_string(),
        }
    }

    /// Overrides the storage key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns today's poem if one was cached today
    pub fn read(&self) -> Option<Poem> {
        self.read_on(today())
    }

    /// Returns the cached poem if it was written on `date`
    pub fn read_on(&self, date: NaiveDate) -> Option<Poem> {
        match self.try_read_on(date) {
            Ok(poem) => poem,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to load cached poem");
                None
            }
        }
    }

    /// Like [`DailyCache::read_on`], but reports store and parse failures
    ///
    /// A missing record or one from another day is `Ok(None)`.
    pub fn try_read_on(&self, date: NaiveDate) -> Result<Option<Poem>, CacheError> {
        let Some(content) = self.store.get(&self.key).map_err(CacheError::Read)? else {
            debug!(key = %self.key, "no cached poem");
            return Ok(None);
        };

        let record: CachedRecord<Poem> =
            serde_json::from_str(&content).map_err(CacheError::Malformed)?;

        if record.date != date {
            debug!(cached = %record.date, today = %date, "cached poem is stale");
            return Ok(None);
        }

        Ok(Some(record.poetry))
    }

    /// Caches `poem` as today's poem
    pub fn write(&self, poem: &Poem) {
        self.write_on(today(), poem)
    }

    /// Caches `poem` as the poem for `date`
    pub fn write_on(&self, date: NaiveDate, poem: &Poem) {
        if let Err(e) = self.try_write_on(date, poem) {
            warn!(key = %self.key, error = %e, "failed to save cached poem");
        }
    }

    /// Like [`DailyCache::write_on`], but reports failures
    pub fn try_write_on(&self, date: NaiveDate, poem: &Poem) -> Result<(), CacheError> {
        let record = CachedRecord { date, poetry: poem };
        let json = serde_json::to_string(&record).map_err(CacheError::Malformed)?;

        self.store.set(&self.key, &json).map_err(CacheError::Write)?;
        debug!(key = %self.key, date = %date, "cached poem");
        Ok(())
    }
}
