use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Error surfaced by handlers and the stores they call.
///
/// Model and parse failures both land in `Generation`; callers cannot tell a
/// network problem from a malformed reply.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("User not authenticated")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("{0}")]
    Generation(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotConfigured(_)
            | ApiError::Generation(_)
            | ApiError::Database(_)
            | ApiError::Storage(_)
            | ApiError::Upstream(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Driver errors can carry connection strings; keep them in the log only.
        let message = match self {
            ApiError::Database(err) => {
                log::error!("Database error: {:?}", err);
                "Database error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<bson::oid::Error> for ApiError {
    fn from(_: bson::oid::Error) -> Self {
        ApiError::BadRequest("Invalid ID".to_string())
    }
}

impl From<bson::ser::Error> for ApiError {
    fn from(err: bson::ser::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_variant() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotFound("Route").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Generation("Failed to generate plan").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(ApiError::NotFound("Post").to_string(), "Post not found");
    }
}
