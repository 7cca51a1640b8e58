use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Handler-level error. `Input` is reserved for failures the caller can
/// fix; everything else surfaces as 500 with a short stable message.
#[derive(Debug)]
pub enum AppError {
    Input(&'static str),
    Upstream(&'static str),
    Internal(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AppError::Input(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Upstream(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (code, Json(json!({ "error": message }))).into_response()
    }
}

/// Log the underlying error and replace it with an [`AppError`] carrying a
/// short message for the client.
pub trait ResultExt<T> {
    fn reject(self, msg: &'static str) -> Result<T, AppError>;
    fn reject_input(self, msg: &'static str) -> Result<T, AppError>;
    fn reject_upstream(self, msg: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn reject(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{msg}: {e}");
            AppError::Internal(msg)
        })
    }

    fn reject_input(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{msg}: {e}");
            AppError::Input(msg)
        })
    }

    fn reject_upstream(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{msg}: {e}");
            AppError::Upstream(msg)
        })
    }
}

/// Store failures map to 500, except name validation, which the caller
/// could have avoided and gets a 400.
pub trait StoreResultExt<T> {
    fn reject_store(self, msg: &'static str) -> Result<T, AppError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn reject_store(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| match e {
            StoreError::InvalidName(name_error) => {
                tracing::error!("{msg}: {name_error}");
                AppError::Input(name_error)
            }
            e => {
                tracing::error!("{msg}: {e}");
                AppError::Internal(msg)
            }
        })
    }
}
