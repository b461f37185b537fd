//! Built-in cover image.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

static COVER_PNG: &[u8] = include_bytes!("../../assets/cover.png");

pub async fn cover() -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_LENGTH, COVER_PNG.len().to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        COVER_PNG,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_is_png() {
        assert!(COVER_PNG.starts_with(b"\x89PNG\r\n\x1a\n"));
    }
}
