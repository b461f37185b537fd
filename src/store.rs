//! Catalog store.
//!
//! Holds the one live [`Snapshot`] behind a [`RwLock`]. The lock guards only
//! the `Arc` itself: readers clone the reference and release the lock before
//! doing anything else, and a replacement swaps the whole snapshot at once, so
//! no reader can pair the feed of one scan with the file map of another.

use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{self, FileInfo, Item, Metadata};

/// Point-in-time result of one directory scan. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    feed: Bytes,
    files: HashMap<String, FileInfo>,
    items: Vec<Item>,
}

impl Snapshot {
    /// Derive the feed document and file map from one item list.
    pub fn from_items(metadata: &Metadata, items: Vec<Item>) -> Self {
        let feed = catalog::render_feed(metadata, &items);
        let files = catalog::file_map(metadata.local_root(), &items);
        Self { feed, files, items }
    }

    /// Rendered feed document.
    pub fn feed(&self) -> &Bytes {
        &self.feed
    }

    /// Look up a catalog entry by its relative path.
    pub fn file(&self, path: &str) -> Option<&FileInfo> {
        self.files.get(path)
    }

    pub fn files(&self) -> &HashMap<String, FileInfo> {
        &self.files
    }

    /// Items in feed order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Shared owner of the current snapshot.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<Snapshot>>,
}

impl CatalogStore {
    /// Create a store around the snapshot built at startup.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Return the current snapshot. Never blocks other readers.
    pub fn read(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Install `next` as the current snapshot and return the previous one.
    ///
    /// The previous snapshot stays valid for readers still holding it and is
    /// dropped with its last reference.
    pub fn replace(&self, next: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(next);
        std::mem::replace(&mut *self.current.write(), next)
    }
}
