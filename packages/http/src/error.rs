use std::io;
use std::path::PathBuf;

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use filedrop_store::StoreError;

/// A request-level failure, rendered as an HTTP error response.
///
/// Internal details are logged, never sent to the client.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Insufficient permissions")]
    PermissionDenied,

    /// The requested name failed validation.
    #[error("{0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    #[error("range not satisfiable")]
    RangeNotSatisfiable { len: u64 },

    #[error("{operation} failed")]
    Internal {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Translate a store error raised while performing `operation`.
    pub fn from_store(operation: &'static str, error: StoreError) -> Self {
        match error {
            StoreError::Forbidden { .. } => ApiError::Forbidden(error.to_string()),
            StoreError::NotFound => ApiError::NotFound,
            source => ApiError::Internal { operation, source },
        }
    }

    pub fn io(operation: &'static str, error: io::Error) -> Self {
        ApiError::Internal {
            operation,
            source: StoreError::Io(error),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::PermissionDenied | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal { operation, source } => {
                tracing::error!(operation, error = %source, "store operation failed");
            }
            ApiError::RangeNotSatisfiable { len } => {
                let mut headers = HeaderMap::new();
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{len}")) {
                    headers.insert(header::CONTENT_RANGE, value);
                }
                return (status, headers, self.to_string()).into_response();
            }
            _ => {}
        }
        (status, self.to_string()).into_response()
    }
}

/// Startup and serving failures.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("failed to open storage dir: {0}")]
    Storage(#[source] StoreError),

    #[error("failed to load template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let e = ApiError::from_store("upload", StoreError::forbidden(".."));
        assert_eq!(e.status(), StatusCode::FORBIDDEN);
        assert_eq!(e.to_string(), "path \"..\" not allowed");

        let e = ApiError::from_store("download", StoreError::NotFound);
        assert_eq!(e.status(), StatusCode::NOT_FOUND);

        let e = ApiError::from_store("delete", io::Error::other("EIO").into());
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.to_string(), "delete failed");
    }

    #[test]
    fn internal_error_hides_details() {
        let e = ApiError::io("list", io::Error::other("secret disk path /x/y"));
        assert!(!e.to_string().contains("secret"));
    }

    #[test]
    fn permission_denied_is_forbidden() {
        let response = ApiError::PermissionDenied.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn range_not_satisfiable_sets_content_range() {
        let response = ApiError::RangeNotSatisfiable { len: 5 }.into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */5");
    }
}
