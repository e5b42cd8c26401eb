use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::error::ServerError;

pub static X_TRACE_ID: &str = "x-trace-id";

/// JSON bodies below this size are logged verbatim.
const MAX_LOGGED_BODY: usize = 1024;

/// Request bodies are buffered here before routing, so the cap applies
/// ahead of any handler extractor.
pub const MAX_REQUEST_BODY: usize = 64 * 1024;

/// Wrap each request in an `http_request` span keyed by a trace ID.
///
/// An incoming `x-trace-id` UUID is honoured, otherwise one is generated; it
/// is echoed on both the forwarded request and the response.
pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let limited = Body::new(Limited::new(body, MAX_REQUEST_BODY));
        let req_bytes = match buffer_and_log("request", &parts.headers, limited).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let too_large = e.into_inner().downcast_ref::<LengthLimitError>().is_some();
                let err = if too_large {
                    ServerError::PayloadTooLarge(format!(
                        "request body exceeds {MAX_REQUEST_BODY} bytes"
                    ))
                } else {
                    ServerError::BadRequest("unreadable request body".to_owned())
                };
                warn!(error = %err, "rejecting request body");
                return err.into_response();
            }
        };
        let mut req = Request::from_parts(parts, Body::from(req_bytes));
        if let Some(value) = &trace_header {
            req.headers_mut().insert(X_TRACE_ID, value.clone());
        }

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let res_bytes = buffer_and_log("response", &parts.headers, body)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to buffer response body");
                Bytes::new()
            });
        let mut response = Response::from_parts(parts, Body::from(res_bytes));
        if let Some(value) = trace_header {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Collect a body, logging it when it is small JSON.
async fn buffer_and_log(
    direction: &str,
    headers: &HeaderMap,
    body: Body,
) -> Result<Bytes, axum::Error> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let bytes = body.collect().await?.to_bytes();

    if content_type.contains("application/json") && bytes.len() < MAX_LOGGED_BODY {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            info!("{} body: {}", direction, text);
        }
    } else if !bytes.is_empty() {
        info!(
            "{} body: [skipped: type={}, size={}]",
            direction,
            content_type,
            bytes.len()
        );
    }

    Ok(bytes)
}

#[cfg(test)]
mod test {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/echo", post(|body: Bytes| async move { body.len().to_string() }))
            .layer(axum::middleware::from_fn(trace_middleware))
    }

    fn post_bytes(len: usize) -> Request<Body> {
        axum::http::Request::post("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(vec![b' '; len]))
            .unwrap()
    }

    #[tokio::test]
    async fn oversized_request_body_is_refused() {
        let resp = app().oneshot(post_bytes(MAX_REQUEST_BODY + 1)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
    }

    #[tokio::test]
    async fn body_within_limit_reaches_the_handler() {
        let resp = app().oneshot(post_bytes(MAX_REQUEST_BODY)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(X_TRACE_ID));
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], MAX_REQUEST_BODY.to_string().as_bytes());
    }
}
