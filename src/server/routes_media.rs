//! Media file downloads with HTTP range and conditional request support.
//!
//! The catalog decides what exists; the file itself is opened fresh for every
//! request and closed when the body stream ends.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::Response,
};
use chrono::{DateTime, Utc};
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::{AppContext, ServeError};
use crate::catalog::FileInfo;

/// Serve a catalog file by its relative path.
pub async fn serve_media(
    State(ctx): State<AppContext>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ServeError> {
    // Copy the entry out so the snapshot is not held during I/O.
    let info: FileInfo = ctx
        .store
        .read()
        .file(&path)
        .cloned()
        .ok_or(ServeError::NotFound)?;

    let open_err = |source: std::io::Error| ServeError::Open {
        path: info.path.clone(),
        source,
    };
    let mut file = File::open(&info.path).await.map_err(open_err)?;
    let file_size = file.metadata().await.map_err(open_err)?.len();

    let last_modified = http_date(&info.mod_time);

    if let Some(since) = header_date(&headers, &header::IF_UNMODIFIED_SINCE) {
        if info.mod_time.timestamp() > since.timestamp() {
            return Err(ServeError::PreconditionFailed);
        }
    }

    if let Some(since) = header_date(&headers, &header::IF_MODIFIED_SINCE) {
        if info.mod_time.timestamp() <= since.timestamp() {
            return Response::builder()
                .status(StatusCode::NOT_MODIFIED)
                .header(header::LAST_MODIFIED, &last_modified)
                .body(Body::empty())
                .map_err(|e| ServeError::Internal(e.to_string()));
        }
    }

    let range = headers
        .get(header::RANGE)
        .and_then(|h| h.to_str().ok())
        .filter(|_| if_range_matches(&headers, &info.mod_time))
        .map(|s| parse_range_header(s, file_size))
        .unwrap_or(ByteRange::Full);

    match range {
        ByteRange::Partial { start, end } => {
            let length = end - start + 1;

            file.seek(SeekFrom::Start(start)).await.map_err(open_err)?;

            let stream = ReaderStream::new(file.take(length));
            let body = Body::from_stream(stream);

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, info.mime_type)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, file_size),
                )
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::LAST_MODIFIED, &last_modified)
                .body(body)
                .map_err(|e| ServeError::Internal(e.to_string()))
        }
        ByteRange::Unsatisfiable => Err(ServeError::RangeNotSatisfiable { size: file_size }),
        ByteRange::Full => {
            // Bounded by the declared length in case the file is still growing.
            let stream = ReaderStream::new(file.take(file_size));
            let body = Body::from_stream(stream);

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, info.mime_type)
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::LAST_MODIFIED, &last_modified)
                .body(body)
                .map_err(|e| ServeError::Internal(e.to_string()))
        }
    }
}

/// Outcome of interpreting a `Range` header against a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRange {
    /// No usable range: send the whole file.
    Full,
    /// Inclusive byte range.
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Parse HTTP Range header.
///
/// Supports a single range in these forms:
/// - bytes=0-499
/// - bytes=500-
/// - bytes=-500 (last 500 bytes)
///
/// Malformed headers and multi-range requests fall back to the full file.
fn parse_range_header(header: &str, file_size: u64) -> ByteRange {
    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return ByteRange::Full;
    };
    if spec.contains(',') {
        return ByteRange::Full;
    }

    let Some((start, end)) = spec.split_once('-') else {
        return ByteRange::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        // bytes=-500 (last 500 bytes)
        (true, false) => {
            let Ok(suffix_len) = end.parse::<u64>() else {
                return ByteRange::Full;
            };
            if suffix_len == 0 || file_size == 0 {
                return ByteRange::Unsatisfiable;
            }
            ByteRange::Partial {
                start: file_size.saturating_sub(suffix_len),
                end: file_size - 1,
            }
        }
        // bytes=500- (from 500 to end)
        (false, true) => {
            let Ok(start) = start.parse::<u64>() else {
                return ByteRange::Full;
            };
            if start >= file_size {
                return ByteRange::Unsatisfiable;
            }
            ByteRange::Partial {
                start,
                end: file_size - 1,
            }
        }
        // bytes=0-499
        (false, false) => {
            let (Ok(start), Ok(end)) = (start.parse::<u64>(), end.parse::<u64>()) else {
                return ByteRange::Full;
            };
            if start > end {
                return ByteRange::Full;
            }
            if start >= file_size {
                return ByteRange::Unsatisfiable;
            }
            ByteRange::Partial {
                start,
                end: end.min(file_size - 1),
            }
        }
        // bytes=- (invalid)
        (true, true) => ByteRange::Full,
    }
}

/// Format a timestamp as an HTTP-date (IMF-fixdate).
fn http_date(time: &DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn header_date(headers: &HeaderMap, name: &HeaderName) -> Option<DateTime<Utc>> {
    let value = headers.get(name)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// `If-Range` keeps the range only when its date matches the stored
/// modification time. Entity tags are never issued, so they never match.
fn if_range_matches(headers: &HeaderMap, mod_time: &DateTime<Utc>) -> bool {
    let Some(value) = headers.get(header::IF_RANGE) else {
        return true;
    };
    match header_date(headers, &header::IF_RANGE) {
        Some(date) => date.timestamp() == mod_time.timestamp(),
        None => {
            tracing::debug!("Ignoring range with non-date If-Range: {:?}", value);
            false
        }
    }
}
