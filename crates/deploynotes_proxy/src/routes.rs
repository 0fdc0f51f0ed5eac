//! HTTP surface of the sync proxy.

use crate::error::ProxyError;
use crate::gist::GistClient;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::routing::any;
use axum::{Json, Router};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

pub const UPDATE_PATH: &str = "/api/update-gist";
pub const UPDATED_MESSAGE: &str = "Gist updated";

/// Shared handler state. Holds no data between requests besides the client.
#[derive(Clone)]
pub struct ProxyState {
    pub gist: Arc<GistClient>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: String,
}

/// Builds the proxy router.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(UPDATE_PATH, any(update_gist))
        .with_state(state)
}

async fn update_gist(
    State(state): State<ProxyState>,
    method: Method,
    body: Bytes,
) -> Result<Json<UpdateResponse>, ProxyError> {
    if method != Method::POST {
        warn!("event=proxy_update module=proxy status=error error_code=method_not_allowed method={method}");
        return Err(ProxyError::MethodNotAllowed);
    }

    let tips = extract_tips(&body).map_err(|err| {
        warn!("event=proxy_update module=proxy status=error error_code=bad_request error={err}");
        err
    })?;

    let started_at = Instant::now();
    if let Err(err) = state.gist.overwrite(&tips).await {
        error!(
            "event=proxy_update module=proxy status=error error_code=upstream_failed notes={} duration_ms={} error={}",
            tips.len(),
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    info!(
        "event=proxy_update module=proxy status=ok file={} notes={} duration_ms={}",
        state.gist.file_name(),
        tips.len(),
        started_at.elapsed().as_millis()
    );
    Ok(Json(UpdateResponse {
        message: UPDATED_MESSAGE.to_string(),
    }))
}

/// Pulls the `tips` array out of a request body.
pub fn extract_tips(body: &[u8]) -> Result<Vec<Value>, ProxyError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| ProxyError::BadRequest(format!("body is not JSON: {err}")))?;
    match value {
        Value::Object(mut fields) => match fields.remove("tips") {
            Some(Value::Array(tips)) => Ok(tips),
            Some(_) => Err(ProxyError::BadRequest("`tips` must be an array".to_string())),
            None => Err(ProxyError::BadRequest("`tips` is missing".to_string())),
        },
        _ => Err(ProxyError::BadRequest(
            "body must be a JSON object".to_string(),
        )),
    }
}
