//! Remote document writer backed by the GitHub gist API.
//!
//! # Invariants
//! - Every write replaces the whole file content; there are no patches of
//!   individual notes.
//! - File content is pretty-printed with 2-space indentation.

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde_json::{json, Map, Value};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const PROXY_USER_AGENT: &str = concat!("deploynotes-proxy/", env!("CARGO_PKG_VERSION"));

/// Overwrites one file of one gist.
#[derive(Clone)]
pub struct GistClient {
    client: reqwest::Client,
    endpoint: String,
    file_name: String,
    token: String,
}

impl GistClient {
    pub fn new(config: &ProxyConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &ProxyConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: format!("{}/gists/{}", config.api_base, config.gist_id),
            file_name: config.file_name.clone(),
            token: config.token.clone(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Replaces the gist file content with `tips`.
    ///
    /// # Errors
    /// - `ProxyError::Upstream` carrying the upstream status and body text,
    ///   or the transport error text when no response arrived.
    pub async fn overwrite(&self, tips: &[Value]) -> Result<(), ProxyError> {
        let content = render_document(tips);
        let mut files = Map::new();
        files.insert(self.file_name.clone(), json!({ "content": content }));
        let body = json!({ "files": files });

        let response = self
            .client
            .patch(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, PROXY_USER_AGENT)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProxyError::Upstream {
                status: None,
                body: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProxyError::Upstream {
                status: Some(status.as_u16()),
                body,
            });
        }
        Ok(())
    }
}

/// Renders the stored document: the tips array, pretty-printed.
pub fn render_document(tips: &[Value]) -> String {
    serde_json::to_string_pretty(tips).unwrap_or_else(|_| "[]".to_string())
}
