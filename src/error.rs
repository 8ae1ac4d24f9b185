use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::{debug, error};

#[derive(Debug, ThisError)]
pub enum QuillError {
    #[error("no usable AWS credentials: {0}")]
    CredentialsUnavailable(String),

    #[error("failed to sign connection token: {0}")]
    SigningFailed(String),

    #[error("CLUSTER_ENDPOINT is not configured")]
    EndpointNotConfigured,

    #[error("database connection failed: {0}")]
    ConnectionRefused(#[source] SqlxError),

    #[error("id allocation failed: {0}")]
    AllocationFailed(String),

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    #[error("stored password hash is malformed")]
    CorruptCredentialRecord,

    #[error("session token expired")]
    TokenExpired,

    #[error("session token invalid")]
    TokenInvalid,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("JWT_SECRET is not configured")]
    SessionSecretNotConfigured,

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Config error: {0}")]
    Config(#[from] figment::Error),

    #[error("blocking task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl QuillError {
    /// User-triggerable outcomes; everything else is an infrastructure fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            QuillError::NotFound(_)
                | QuillError::InvalidArgument(_)
                | QuillError::EmptyPassword
                | QuillError::TokenExpired
                | QuillError::TokenInvalid
                | QuillError::InvalidCredentials
                | QuillError::UsernameTaken(_)
        )
    }
}

impl IntoResponse for QuillError {
    fn into_response(self) -> axum::response::Response {
        if self.is_client_error() {
            debug!(error = %self, "request rejected");
        } else {
            error!(error = %self, "request failed");
        }

        let (status, error_body) = match &self {
            QuillError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found."),
                },
            ),
            QuillError::InvalidArgument(reason) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_ARGUMENT".to_string(),
                    message: reason.clone(),
                },
            ),
            QuillError::EmptyPassword => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "INVALID_ARGUMENT".to_string(),
                    message: "Password cannot be empty.".to_string(),
                },
            ),
            QuillError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "TOKEN_EXPIRED".to_string(),
                    message: "Session token expired.".to_string(),
                },
            ),
            QuillError::TokenInvalid | QuillError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Authentication error.".to_string(),
                },
            ),
            QuillError::UsernameTaken(_) => (
                StatusCode::CONFLICT,
                ApiErrorBody {
                    code: "CONFLICT".to_string(),
                    message: "Username already taken.".to_string(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "Failed to process the request.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
