use chrono::{DateTime, Utc};
use std::path::Path;
use walkdir::WalkDir;

use super::{Enclosure, Item, Metadata};
use crate::error::{Error, Result};

/// Map a file extension to the enclosure MIME type.
///
/// Only these formats are published; podcast clients accept `audio/x-m4a` for
/// both `.m4a` and audio-only `.mp4`. Matching is exact, so `.MP3` is skipped.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let (_, ext) = split_extension(path.file_name()?.to_str()?)?;
    match ext {
        "mp3" => Some("audio/mpeg"),
        "mp4" | "m4a" => Some("audio/x-m4a"),
        _ => None,
    }
}

/// Split a file name at its last '.', into stem and extension.
///
/// Unlike [`Path::extension`], a leading dot counts: `.mp3` has an empty stem
/// and the extension `mp3`.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once('.')
}

/// Walk the media root and return one [`Item`] per recognized file, in
/// file-name order. Unrecognized extensions are skipped silently.
pub fn scan_items(metadata: &Metadata) -> Result<Vec<Item>> {
    let root = metadata.local_root();
    let mut items = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::scan(root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Some(mime_type) = mime_type_for(entry.path()) else {
            continue;
        };

        let Some(rel_path) = relative_path(root, entry.path()) else {
            tracing::warn!("Skipping non UTF-8 path: {:?}", entry.path());
            continue;
        };

        // Links are published with the size and time of their target.
        let info = if entry.path_is_symlink() {
            match std::fs::metadata(entry.path()) {
                Ok(info) => info,
                Err(e) => {
                    tracing::warn!("Skipping broken link {:?}: {}", entry.path(), e);
                    continue;
                }
            }
        } else {
            entry.metadata().map_err(|e| Error::scan(root, e))?
        };
        if !info.is_file() {
            continue;
        }
        let mod_time: DateTime<Utc> = info.modified()?.into();

        let title = rel_path
            .rsplit('/')
            .next()
            .and_then(split_extension)
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_default();
        let url = format!("{}{}", metadata.external_url(), escape_path(&rel_path));

        items.push(Item {
            title,
            path: rel_path,
            mod_time,
            link: url.clone(),
            description: String::new(),
            enclosure: Enclosure {
                url,
                length: info.len(),
                mime_type,
            },
        });
    }

    Ok(items)
}

/// `root`-relative path with '/' separators, or `None` if not valid UTF-8.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let segments = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(segments.join("/"))
}

/// Percent-escape each segment of a relative path, keeping the separators.
fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        for byte in segment.bytes() {
            match byte {
                b'A'..=b'Z'
                | b'a'..=b'z'
                | b'0'..=b'9'
                | b'-'
                | b'.'
                | b'_'
                | b'~'
                | b'$'
                | b'&'
                | b'+'
                | b','
                | b':'
                | b'='
                | b'@' => out.push(byte as char),
                _ => out.push_str(&format!("%{byte:02X}")),
            }
        }
    }
    out
}
