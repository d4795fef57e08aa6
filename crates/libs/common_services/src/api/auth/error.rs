use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ClientNotFound,
    PermissionDenied { subject: String, path: String },
    Internal(eyre::Report),
}

fn log_auth_failure(error: &AuthError) {
    match error {
        AuthError::MissingToken => warn!("Authentication failed: Missing Authorization token."),
        AuthError::InvalidToken => warn!("Authentication failed: Invalid token provided."),
        AuthError::ClientNotFound => warn!("Authentication failed: Client from token not found."),
        AuthError::PermissionDenied { subject, path } => {
            warn!("Authorization failed: {subject} tried to access client endpoint: {path}");
        }
        AuthError::Internal(e) => error!("Internal server error during authentication: {:?}", e),
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        log_auth_failure(&self);

        let (status, error_message) = match self {
            Self::MissingToken | Self::InvalidToken | Self::ClientNotFound => {
                (StatusCode::UNAUTHORIZED, "Authentication failed")
            }
            Self::PermissionDenied { .. } => (StatusCode::FORBIDDEN, "Permission denied"),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred",
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// Lets `?` turn database and other errors into `AuthError::Internal`.
impl<E> From<E> for AuthError
where
    E: Into<eyre::Report>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
