//! Request Dispatch
//!
//! One fallback handler receives every request, classifies it, makes at most
//! one store call, and renders the outcome. The response is written exactly
//! once, after that call resolves.
//!
//! Only `POST /insert` reads its body. The read is bounded by
//! [`HttpServerConfig::max_body_bytes`](super::HttpServerConfig) and an
//! oversized body is answered with a JSON 413.

use std::collections::HashMap;
use std::pin::pin;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Query, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::StreamExt;
use serde::Serialize;

use crate::gateway::{classify, Classified, GatewayError, GatewayResult, Route};
use crate::store::{ExecOutcome, PatientStore};

/// Insert success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertResponse {
    pub success: bool,
    pub inserted: u64,
}

impl InsertResponse {
    pub fn new(inserted: u64) -> Self {
        Self {
            success: true,
            inserted,
        }
    }
}

/// Router state: the shared store and the body ceiling
pub(crate) struct GatewayState<S> {
    store: Arc<S>,
    max_body_bytes: usize,
}

impl<S> GatewayState<S> {
    pub(crate) fn new(store: Arc<S>, max_body_bytes: usize) -> Self {
        Self {
            store,
            max_body_bytes,
        }
    }
}

// Manual impl: the store itself need not be Clone
impl<S> Clone for GatewayState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Fallback handler for every method and path
pub(crate) async fn dispatch<S: PatientStore + 'static>(
    State(state): State<GatewayState<S>>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let path = parts.uri.path();

    let params = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(params)| params)
        .unwrap_or_default();

    let result = match read_body(&method, path, &parts.headers, body, state.max_body_bytes).await {
        Ok(body) => handle(state.store.as_ref(), &method, path, &params, &body).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(response) => response,
        Err(err) => {
            match &err {
                GatewayError::Data(data_err) => {
                    tracing::warn!(%method, path, error = %data_err, "statement failed")
                }
                other => {
                    tracing::debug!(%method, path, error = %other, "request rejected")
                }
            }
            err.into_response()
        }
    }
}

/// Buffer the body of `POST /insert`; every other request is answered
/// without touching its body.
async fn read_body(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> GatewayResult<Bytes> {
    if Route::resolve(method, path) != Some(Route::Insert) {
        return Ok(Bytes::new());
    }

    if declared_length(headers).is_some_and(|length| length > limit) {
        return Err(GatewayError::PayloadTooLarge(limit));
    }

    let mut stream = pin!(body.into_data_stream());
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::debug!(error = %e, "body read failed");
            GatewayError::BodyRead
        })?;
        if buffer.len() + chunk.len() > limit {
            return Err(GatewayError::PayloadTooLarge(limit));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buffer))
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

async fn handle<S: PatientStore>(
    store: &S,
    method: &Method,
    path: &str,
    params: &HashMap<String, String>,
    body: &[u8],
) -> GatewayResult<Response> {
    match classify(method, path, params, body)? {
        Classified::Preflight => Ok(StatusCode::OK.into_response()),
        Classified::Unrecognized => Err(GatewayError::Unrecognized),
        Classified::InsertDirect(statement) => {
            let outcome = store.execute(&statement).await?;
            Ok(render_insert(affected_rows(&outcome)))
        }
        Classified::InsertBulk(rows) => {
            let inserted = store.bulk_insert(rows).await?;
            Ok(render_insert(inserted))
        }
        Classified::QueryDirect(statement) => {
            let outcome = store.execute(&statement).await?;
            Ok(render_outcome(outcome))
        }
    }
}

fn affected_rows(outcome: &ExecOutcome) -> u64 {
    match outcome {
        ExecOutcome::Affected(count) => *count,
        ExecOutcome::Rows(_) => 0,
    }
}

fn render_insert(inserted: u64) -> Response {
    (StatusCode::OK, Json(InsertResponse::new(inserted))).into_response()
}

/// Result sets go out as a bare array; mutations as an insert body
fn render_outcome(outcome: ExecOutcome) -> Response {
    match outcome {
        ExecOutcome::Rows(rows) => (StatusCode::OK, Json(rows)).into_response(),
        ExecOutcome::Affected(count) => render_insert(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn headers_with_length(length: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, length.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let body = read_body(&Method::POST, "/insert", &HeaderMap::new(), Body::from("{}"), 2)
            .await
            .unwrap();
        assert_eq!(&body[..], b"{}");
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let result = read_body(&Method::POST, "/insert", &HeaderMap::new(), Body::from("{ }"), 2).await;
        assert_eq!(result, Err(GatewayError::PayloadTooLarge(2)));
    }

    #[tokio::test]
    async fn test_read_body_trusts_declared_length_for_early_reject() {
        let result = read_body(
            &Method::POST,
            "/insert",
            &headers_with_length("1048576"),
            Body::empty(),
            1024,
        )
        .await;
        assert_eq!(result, Err(GatewayError::PayloadTooLarge(1024)));
    }

    #[tokio::test]
    async fn test_read_body_skips_other_routes() {
        for (method, path) in [
            (Method::OPTIONS, "/insert"),
            (Method::GET, "/query"),
            (Method::POST, "/other"),
        ] {
            let body = read_body(&method, path, &headers_with_length("999999"), Body::from("xyz"), 1)
                .await
                .unwrap();
            assert!(body.is_empty());
        }
    }

    #[test]
    fn test_declared_length() {
        assert_eq!(declared_length(&headers_with_length("42")), Some(42));
        assert_eq!(declared_length(&headers_with_length("lots")), None);
        assert_eq!(declared_length(&HeaderMap::new()), None);
    }

    #[test]
    fn test_insert_response_serialization() {
        let json = serde_json::to_value(InsertResponse::new(3)).unwrap();
        assert_eq!(json, json!({"success": true, "inserted": 3}));
    }

    #[test]
    fn test_affected_rows() {
        assert_eq!(affected_rows(&ExecOutcome::Affected(2)), 2);
        assert_eq!(affected_rows(&ExecOutcome::Rows(vec![Map::new()])), 0);
    }

    #[test]
    fn test_render_outcome_status() {
        let mut row = Map::new();
        row.insert("id".to_string(), Value::from(1));
        assert_eq!(render_outcome(ExecOutcome::Rows(vec![row])).status(), StatusCode::OK);
        assert_eq!(render_outcome(ExecOutcome::Affected(1)).status(), StatusCode::OK);
    }
}
