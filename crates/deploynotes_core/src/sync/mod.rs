//! Remote write path: transport seam and submission dispatcher.
//!
//! # Responsibility
//! - Define how a full collection is pushed to the sync proxy.
//! - Submit pushes without blocking local mutations.
//!
//! # Invariants
//! - A push always carries the complete collection, never a delta.
//! - A failed push never touches local state; it is reported, not retried.
//! - In `Ordered` mode at most one push is in flight and pushes complete in
//!   submission order.

use crate::model::note::Note;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod dispatcher;
mod transport;

pub use dispatcher::SyncDispatcher;
pub use transport::ProxySyncClient;

/// Push to the remote store failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No proxy URL is configured.
    NotConfigured,
    /// Request never produced a response.
    Transport(String),
    /// Proxy answered with a non-success status.
    Rejected { status: u16, body: String },
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "sync proxy URL is not configured"),
            Self::Transport(details) => write!(f, "sync request failed: {details}"),
            Self::Rejected { status, body } => {
                write!(f, "sync proxy rejected push: HTTP {status}: {body}")
            }
        }
    }
}

impl Error for SyncError {}

/// How queued pushes are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// One background worker, strict submission order.
    #[default]
    Ordered,
    /// One task per push; completion order is unspecified.
    Concurrent,
}

impl SyncMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ordered" => Some(Self::Ordered),
            "concurrent" => Some(Self::Concurrent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ordered => "ordered",
            Self::Concurrent => "concurrent",
        }
    }
}

/// Write access to the remote store, always through the proxy.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    /// Overwrites the remote document with `notes`.
    async fn push(&self, notes: &[Note]) -> Result<(), SyncError>;
}
