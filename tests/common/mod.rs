//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which owns a temporary media directory, a config
//! pointing at it, and an [`AppContext`] whose store holds the first scan.
//! [`TestHarness::spawn_server`] runs the real server on a random port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use podserve::catalog;
use podserve::config::Config;
use podserve::refresh::{refresh_once, RefreshOutcome};
use podserve::server::{create_router, AppContext, Server};
use podserve::store::CatalogStore;

pub const BASE_URL: &str = "http://pods.test/";

pub struct TestHarness {
    pub dir: TempDir,
    pub config: Config,
    pub ctx: AppContext,
}

impl TestHarness {
    /// Harness over an empty media directory.
    pub fn new() -> Self {
        Self::with_files(&[])
    }

    /// Harness over a media directory seeded with `files` (relative path, contents).
    pub fn with_files(files: &[(&str, &[u8])]) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        for (path, data) in files {
            write_file(dir.path(), path, data);
        }

        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_grace_secs = 5;
        config.feed.root = dir.path().to_path_buf();
        config.feed.external_url = BASE_URL.to_string();

        let metadata = Arc::new(config.metadata());
        let snapshot = catalog::build(&metadata).expect("initial scan failed");
        let ctx = AppContext {
            store: Arc::new(CatalogStore::new(snapshot)),
            metadata,
        };

        Self { dir, config, ctx }
    }

    pub fn write(&self, path: &str, data: &[u8]) {
        write_file(self.dir.path(), path, data);
    }

    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).expect("failed to remove file");
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        refresh_once(&self.ctx.store, &self.ctx.metadata)
            .await
            .expect("refresh failed")
    }

    /// Current feed document as a string.
    pub fn feed(&self) -> String {
        String::from_utf8(self.ctx.store.read().feed().to_vec()).unwrap()
    }

    /// Bind and run a real server for this harness's directory.
    pub async fn spawn_server(&self) -> RunningServer {
        let server = Server::bind(&self.config).await.expect("failed to bind server");
        let addr = server.local_addr().expect("failed to get local addr");
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(server.run(cancel.clone()));
        RunningServer {
            addr,
            cancel,
            handle,
        }
    }
}

pub struct RunningServer {
    pub addr: SocketAddr,
    pub cancel: CancellationToken,
    pub handle: JoinHandle<anyhow::Result<()>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

fn write_file(root: &Path, path: &str, data: &[u8]) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(full, data).expect("failed to write file");
}

/// Collect a response body.
pub async fn body_bytes(body: Body) -> Bytes {
    body.collect().await.unwrap().to_bytes()
}

/// Deterministic test payload of `len` bytes.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..=255u8).cycle().take(len).collect()
}
