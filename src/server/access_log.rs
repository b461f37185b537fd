//! Access log middleware.
//!
//! Emits one `info` event per request once the handler has produced the
//! response head.

use axum::extract::{ConnectInfo, Request};
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;

static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Status and length of a finished response, read from its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseRecord {
    pub status: StatusCode,
    pub content_length: Option<u64>,
}

impl ResponseRecord {
    pub fn from_response(response: &Response) -> Self {
        let content_length = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        Self {
            status: response.status(),
            content_length,
        }
    }
}

fn header_str(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

pub async fn access_log(request: Request, next: Next) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let proto = request.version();
    let forwarded_for = header_str(request.headers(), &X_FORWARDED_FOR);
    let user_agent = header_str(request.headers(), &header::USER_AGENT);

    let response = next.run(request).await;
    let record = ResponseRecord::from_response(&response);

    tracing::info!(
        target: "podserve::access",
        remote_addr = %remote_addr,
        method = %method,
        path = %path,
        proto = ?proto,
        status = record.status.as_u16(),
        content_length = record.content_length,
        x_forwarded_for = forwarded_for.as_deref(),
        user_agent = user_agent.as_deref(),
        "Sent response"
    );

    response
}
