//! Error types for twmod-mq
//!
//! Only `NotFound` and `InvalidInput` ever reach API callers from moderation
//! operations. Upstream and persistence failures are handled where they occur
//! (logged, then recovered or retried).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::stream::StreamError;

/// Main error type for twmod-mq
#[derive(Error, Debug)]
pub enum Error {
    /// Tweet id absent from every searched queue
    #[error("Tweet not found: {0}")]
    NotFound(u64),

    /// Invalid request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Upstream subscription failed
    #[error("Upstream error: {0}")]
    Upstream(#[from] StreamError),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// twmod-common error
    #[error("Common error: {0}")]
    Common(#[from] twmod_common::Error),
}

/// Convenience Result type using twmod-mq Error
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Error::Common(twmod_common::Error::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            Error::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Error::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
            Error::Http(_) | Error::Common(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "status": 0,
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn error_code(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_database_failure_maps_to_persistence_error() {
        let (status, body) = error_code(Error::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 0);
        assert_eq!(body["error"]["code"], "PERSISTENCE_ERROR");
    }

    #[tokio::test]
    async fn test_caller_errors_keep_their_status() {
        let (status, body) = error_code(Error::NotFound(7)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Tweet not found: 7");

        let (status, _) = error_code(Error::Common(twmod_common::Error::InvalidInput(
            "bad".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
