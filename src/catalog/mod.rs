//! Catalog builder.
//!
//! Turns the state of the media directory at one point in time into the
//! ordered item list, the path -> [`FileInfo`] map, and the rendered feed.
//! Building is a pure, re-runnable function of the file system: the same tree
//! always renders to the same bytes.

mod feed;
mod scan;

pub use feed::render_feed;
pub use scan::{mime_type_for, scan_items};

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::Snapshot;

/// Path of the built-in cover image, relative to the external URL.
pub const COVER_PATH: &str = "cover.png";

/// Channel-level feed configuration. Set once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
    pub cover_url: String,

    external_url: String,
    local_root: PathBuf,
}

impl Metadata {
    pub fn new(
        title: &str,
        description: &str,
        language: &str,
        external_url: &str,
        cover_url: Option<&str>,
        local_root: &Path,
    ) -> Self {
        let mut external_url = external_url.trim().to_string();
        if !external_url.ends_with('/') {
            external_url.push('/');
        }

        let cover_url = match cover_url.map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("{external_url}{COVER_PATH}"),
        };

        Self {
            title: title.to_string(),
            link: external_url.clone(),
            description: description.to_string(),
            language: language.to_string(),
            cover_url,
            external_url,
            local_root: local_root.to_path_buf(),
        }
    }

    /// Prefix of every public link, always ending in '/'.
    pub fn external_url(&self) -> &str {
        &self.external_url
    }

    /// Directory the catalog is built from.
    pub fn local_root(&self) -> &Path {
        &self.local_root
    }
}

/// Downloadable media attachment of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub length: u64,
    pub mime_type: &'static str,
}

/// One catalog entry, keyed by its relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    /// Path relative to the media root, '/'-separated.
    pub path: String,
    pub mod_time: DateTime<Utc>,
    pub link: String,
    pub description: String,
    pub enclosure: Enclosure,
}

/// What the file handler needs to serve an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Absolute file-system path.
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub size: u64,
    pub mod_time: DateTime<Utc>,
}

impl FileInfo {
    pub fn from_item(root: &Path, item: &Item) -> Self {
        let path = item
            .path
            .split('/')
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment));
        Self {
            path,
            mime_type: item.enclosure.mime_type,
            size: item.enclosure.length,
            mod_time: item.mod_time,
        }
    }
}

/// Build a fresh snapshot from the current state of `metadata.local_root()`.
///
/// Blocking: walks and stats the whole tree.
pub fn build(metadata: &Metadata) -> Result<Snapshot> {
    let items = scan_items(metadata)?;
    Ok(Snapshot::from_items(metadata, items))
}

/// Index items by relative path.
pub fn file_map(root: &Path, items: &[Item]) -> HashMap<String, FileInfo> {
    items
        .iter()
        .map(|item| (item.path.clone(), FileInfo::from_item(root, item)))
        .collect()
}
