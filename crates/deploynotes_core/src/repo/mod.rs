//! Persistence abstractions for the local cache.
//!
//! # Responsibility
//! - Define the keyed cache contract consumed by the note store.
//! - Isolate SQLite details from store orchestration.

pub mod cache_repo;
