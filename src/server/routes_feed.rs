//! Feed document handler.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use super::AppContext;

pub const FEED_CONTENT_TYPE: &str = "application/rss+xml; charset=UTF-8";

/// Serve the stored feed bytes of the current snapshot verbatim.
pub async fn feed(State(ctx): State<AppContext>) -> Response {
    let body = ctx.store.read().feed().clone();

    (
        [
            (header::CONTENT_TYPE, FEED_CONTENT_TYPE.to_string()),
            (header::CONTENT_LENGTH, body.len().to_string()),
        ],
        body,
    )
        .into_response()
}
