//! Background catalog refresh.
//!
//! Rebuilds the catalog from scratch on a fixed period and installs the new
//! snapshot only when the rendered feed differs from the stored one. A failed
//! scan leaves the last good snapshot in place until the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::catalog::{self, Metadata};
use crate::error::{Error, Result};
use crate::store::CatalogStore;

/// Result of a single refresh tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The feed is byte-identical; the store was left alone.
    Unchanged,
    /// A new snapshot with `items` entries was installed.
    Updated { items: usize },
}

/// Rebuild the catalog once and install it if the feed changed.
///
/// The scan runs on the blocking pool; the store lock is only taken to read
/// the current reference and to swap in the new one.
pub async fn refresh_once(
    store: &CatalogStore,
    metadata: &Arc<Metadata>,
) -> Result<RefreshOutcome> {
    let md = metadata.clone();
    let next = tokio::task::spawn_blocking(move || catalog::build(&md))
        .await
        .map_err(|e| Error::Internal(format!("catalog scan task failed: {e}")))??;

    if store.read().feed() == next.feed() {
        return Ok(RefreshOutcome::Unchanged);
    }

    let items = next.len();
    store.replace(next);
    Ok(RefreshOutcome::Updated { items })
}

/// Run [`refresh_once`] every `period` until `cancel` fires.
///
/// The first tick happens one full period after start; the initial snapshot
/// is built by the caller before the server accepts connections.
pub async fn run_refresh_loop(
    store: Arc<CatalogStore>,
    metadata: Arc<Metadata>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        "Catalog refresh started (every {}s)",
        period.as_secs_f64()
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            _ = cancel.cancelled() => { break; }
        }

        match refresh_once(&store, &metadata).await {
            Ok(RefreshOutcome::Updated { items }) => {
                tracing::info!(items, "Catalog updated");
            }
            Ok(RefreshOutcome::Unchanged) => {
                tracing::debug!("Catalog unchanged");
            }
            Err(e) => {
                tracing::error!(error = %e, "Catalog refresh failed; keeping previous snapshot");
            }
        }
    }

    tracing::info!("Catalog refresh stopped");
}
