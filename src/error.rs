use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::recipes::client::RecipeApiError;

/// Application error taxonomy, mapped onto HTTP statuses in one place.
/// Responses carry a JSON body of the shape `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("User with this email already exists")]
    DuplicateEmail,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Config(String),

    #[error("Unauthorized: missing or invalid Spoonacular API key. Please set SPOONACULAR_API_KEY in the backend environment.")]
    UpstreamAuth,

    #[error("Spoonacular error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The uniform 401 used for every token failure. Bad token and unknown
    /// subject are indistinguishable to the caller.
    pub fn unauthorized() -> Self {
        Self::Unauthorized("Could not validate credentials".into())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl From<RecipeApiError> for AppError {
    fn from(e: RecipeApiError) -> Self {
        match e {
            RecipeApiError::Auth => Self::UpstreamAuth,
            RecipeApiError::NotFound => Self::NotFound("Recipe not found".into()),
            RecipeApiError::Upstream(msg) => Self::Upstream(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::UpstreamAuth => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = match &self {
            // Internal details go to the log, not the client.
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            status_of(AppError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::DuplicateEmail), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::unauthorized()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::NotFound("gone".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(AppError::UpstreamAuth), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AppError::Upstream("boom".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::Config("unset".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn gateway_errors_translate() {
        assert!(matches!(
            AppError::from(RecipeApiError::Auth),
            AppError::UpstreamAuth
        ));
        assert!(matches!(
            AppError::from(RecipeApiError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RecipeApiError::Upstream("timeout".into())),
            AppError::Upstream(_)
        ));
    }

    #[test]
    fn internal_errors_do_not_leak() {
        let resp = status_of(AppError::Internal(anyhow::anyhow!(
            "connection refused to db at 10.0.0.3"
        )));
        assert_eq!(resp, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
