//! HTTP implementation of [`RemoteSnapshot`].

use super::{FetchError, RemoteSnapshot};
use crate::model::collection::decode_collection;
use crate::model::note::Note;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::time::Instant;

/// Fetches the snapshot with a plain `GET` against a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    url: Option<String>,
    client: reqwest::Client,
}

impl HttpSnapshotSource {
    /// `None` yields a source whose fetches fail with `NotConfigured`.
    pub fn new(url: Option<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: Option<String>, client: reqwest::Client) -> Self {
        Self { url, client }
    }
}

#[async_trait]
impl RemoteSnapshot for HttpSnapshotSource {
    async fn fetch(&self) -> Result<Vec<Note>, FetchError> {
        let url = self.url.as_deref().ok_or(FetchError::NotConfigured)?;
        let started_at = Instant::now();

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "event=remote_fetch module=remote status=error http_status={} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let notes = decode_collection(&body)?;
        info!(
            "event=remote_fetch module=remote status=ok notes={} duration_ms={}",
            notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(notes)
    }
}
