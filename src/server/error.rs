//! Handler failure to HTTP response conversion.
//!
//! Responses carry a status and the headers the status requires, never an
//! error body: file-system error text stays in the log.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;

/// Why a request could not be served.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The path is not in the current catalog.
    #[error("not in catalog")]
    NotFound,

    /// The catalog lists the file but it could not be opened (removed or
    /// replaced since the last scan).
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested byte range lies outside the file.
    #[error("range not satisfiable for size {size}")]
    RangeNotSatisfiable { size: u64 },

    /// `If-Unmodified-Since` failed.
    #[error("precondition failed")]
    PreconditionFailed,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::Open { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ServeError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ServeError::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            ServeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Failed to serve file");
        }

        match self {
            ServeError::RangeNotSatisfiable { size } => (
                status,
                [
                    (header::CONTENT_RANGE, format!("bytes */{size}")),
                    (header::ACCEPT_RANGES, "bytes".to_string()),
                ],
            )
                .into_response(),
            _ => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_produces_404() {
        let response = ServeError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn open_failure_produces_500() {
        let err = ServeError::Open {
            path: PathBuf::from("/srv/gone.mp3"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn unsatisfiable_range_reports_size() {
        let response = ServeError::RangeNotSatisfiable { size: 2048 }.into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */2048");
    }
}
