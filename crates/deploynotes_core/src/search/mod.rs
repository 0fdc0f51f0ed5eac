//! Client-side note filtering.
//!
//! # Responsibility
//! - Narrow the in-memory collection for display without touching storage.

pub mod filter;
