//! Client use-case services.
//!
//! # Responsibility
//! - Own the in-memory collection and its cache/remote write paths.
//! - Keep the CLI decoupled from storage and network details.

pub mod note_store;
pub mod transfer;
