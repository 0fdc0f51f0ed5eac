//! HTTP transport posting collections to the sync proxy.

use super::{SyncError, SyncTransport};
use crate::model::note::Note;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Serialize)]
struct PushBody<'a> {
    tips: &'a [Note],
}

/// Posts `{ "tips": [...] }` to the proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxySyncClient {
    url: Option<String>,
    client: reqwest::Client,
}

impl ProxySyncClient {
    /// `None` yields a client whose pushes fail with `NotConfigured`.
    pub fn new(url: Option<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: Option<String>, client: reqwest::Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl SyncTransport for ProxySyncClient {
    async fn push(&self, notes: &[Note]) -> Result<(), SyncError> {
        let url = self.url.as_deref().ok_or(SyncError::NotConfigured)?;
        let response = self
            .client
            .post(url)
            .json(&PushBody { tips: notes })
            .send()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
