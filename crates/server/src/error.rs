use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mathfluent_core::{CoreError, FieldError};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Not signed in")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Internal(msg) => {
                error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let fields = match &self {
            Error::Validation(fields) => fields.clone(),
            _ => Vec::new(),
        };
        let message = match &self {
            Error::Validation(fields) => fields
                .first()
                .map(|f| f.message.clone())
                .unwrap_or_else(|| self.to_string()),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "fields": fields,
            }
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(fields) => Error::Validation(fields),
            CoreError::NotFound(what) => Error::NotFound(what),
            CoreError::NotSignedIn => Error::Unauthorized,
            CoreError::Tutor(msg) => Error::Upstream(msg),
            other => Error::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(format!("{:#}", err))
    }
}
