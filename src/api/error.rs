use crate::sheet::SheetError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Failures reported to callers as `{"error": "<message>"}`.
///
/// Every documented failure is answered with 200 so callers only inspect the
/// payload; only an unparseable body gets a 4xx status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Query is required")]
    QueryRequired,
    #[error("Could not determine source from query")]
    UnroutableQuery,
    #[error("Could not determine data source from query.")]
    UnroutableDirectoryQuery,
    #[error("File {0}.csv not found")]
    SourceNotFound(String),
    #[error("Error reading file: {0}")]
    SourceUnreadable(String),
    #[error("{0}.csv not found.")]
    DirectoryNotFound(String),
    #[error("Failed to read CSV: {0}")]
    DirectoryUnreadable(String),
    #[error(transparent)]
    CallLog(#[from] SheetError),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::OK,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status(),
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
