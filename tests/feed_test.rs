//! Router-level tests for the feed and cover endpoints.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{body_bytes, TestHarness};
use tower::ServiceExt;

#[tokio::test]
async fn feed_serves_stored_bytes() {
    let h = TestHarness::with_files(&[("ep1.mp3", b"one"), ("ep2.m4a", b"two")]);
    let stored = h.ctx.store.read().feed().clone();

    let response = h
        .router()
        .oneshot(Request::get("/feed").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/rss+xml; charset=UTF-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        stored.len().to_string().as_str()
    );
    let body = body_bytes(response.into_body()).await;
    assert_eq!(body, stored);
}

#[tokio::test]
async fn feed_lists_items_with_enclosures() {
    let h = TestHarness::with_files(&[("Morning News.mp3", &[7u8; 321])]);
    let feed = h.feed();

    assert!(feed.contains("<title>My Podcast</title>"));
    assert!(feed.contains("<link>http://pods.test/</link>"));
    assert!(feed.contains(r#"<itunes:image href="http://pods.test/cover.png" />"#));
    assert!(feed.contains("<title>Morning News</title>"));
    assert!(feed.contains(
        r#"<enclosure url="http://pods.test/Morning%20News.mp3" length="321" type="audio/mpeg" />"#
    ));
    assert!(feed.contains("<pubDate>"));
}

#[tokio::test]
async fn feed_head_has_length_and_no_body() {
    let h = TestHarness::with_files(&[("ep1.mp3", b"one")]);
    let stored_len = h.ctx.store.read().feed().len();

    let response = h
        .router()
        .oneshot(
            Request::builder()
                .method(Method::HEAD)
                .uri("/feed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        stored_len.to_string().as_str()
    );
    assert!(body_bytes(response.into_body()).await.is_empty());
}

#[tokio::test]
async fn post_to_feed_is_rejected_and_store_untouched() {
    let h = TestHarness::with_files(&[("ep1.mp3", b"one")]);
    let before = h.ctx.store.read();

    let response = h
        .router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/feed")
                .body(Body::from("<rss/>"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(Arc::ptr_eq(&before, &h.ctx.store.read()));
}

#[tokio::test]
async fn cover_is_served_independent_of_catalog() {
    let h = TestHarness::new();

    let response = h
        .router()
        .oneshot(Request::get("/cover.png").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let body = body_bytes(response.into_body()).await;
    assert!(body.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn cover_rejects_delete() {
    let h = TestHarness::new();

    let response = h
        .router()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/cover.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
