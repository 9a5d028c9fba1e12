//! Daily Poetry CLI Library
//!
//! Fetches a poem at most once per calendar day and caches it locally. The
//! binary's terminal UI is a thin consumer of `PoetryService`.

pub mod cache;
pub mod cli;
pub mod logging;
pub mod poetry;
pub mod service;

pub use cache::{DailyCache, FileStore, KeyValueStore, MemoryStore};
pub use poetry::{FetchError, JinrishiciClient, Poem, PoetrySource};
pub use service::{PoemOrigin, PoetryService, PoetryState};
