//! Sync proxy for deploy notes.
//!
//! Accepts a full note collection over HTTP and overwrites the remote gist
//! file with it, using a credential the client never sees.

pub mod config;
pub mod error;
pub mod gist;
pub mod routes;

pub use config::{ConfigError, ProxyConfig};
pub use error::ProxyError;
pub use gist::GistClient;
pub use routes::{router, ProxyState, UPDATE_PATH};

use std::sync::Arc;

/// Builds the router for `config` with a fresh gist client.
pub fn app(config: &ProxyConfig) -> axum::Router {
    router(ProxyState {
        gist: Arc::new(GistClient::new(config)),
    })
}
