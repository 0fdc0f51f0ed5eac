//! Remote snapshot access.
//!
//! # Responsibility
//! - Define the read seam for the externally hosted note document.
//! - Classify fetch failures (transport, HTTP status, payload shape).
//!
//! # Invariants
//! - A snapshot is returned only when the payload is a JSON array of notes.

use crate::model::collection::FormatError;
use crate::model::note::Note;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod http;

pub use http::HttpSnapshotSource;

/// Remote snapshot fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No remote URL is configured.
    NotConfigured,
    /// Request never produced a response.
    Transport(String),
    /// Remote answered with a non-success status.
    Status { status: u16 },
    /// Remote payload is not an array of notes.
    Format(FormatError),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "remote snapshot URL is not configured"),
            Self::Transport(details) => write!(f, "remote fetch failed: {details}"),
            Self::Status { status } => write!(f, "remote fetch failed: HTTP {status}"),
            Self::Format(err) => write!(f, "remote snapshot rejected: {err}"),
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormatError> for FetchError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

/// Read access to the remote authoritative note document.
#[async_trait]
pub trait RemoteSnapshot: Send + Sync {
    /// Fetches the whole remote collection, bypassing HTTP caches.
    async fn fetch(&self) -> Result<Vec<Note>, FetchError>;
}
