use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use http::{header, StatusCode};
use serde_json::json;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("GNEWS_API_KEY not configured")]
    MissingApiKey,

    #[error("Upstream request failed with status {status}")]
    Upstream { status: StatusCode, details: Value },

    #[error("Server error: {0}")]
    Request(reqwest::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Upstream { status, .. } => *status,
            Error::MissingApiKey | Error::Request(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `{error, status, details}` envelope sent to clients.
    pub fn envelope(&self) -> Value {
        let (error, details) = match self {
            Error::MissingApiKey => ("GNEWS_API_KEY not configured", Value::Null),
            Error::Upstream { details, .. } => ("Upstream request failed", details.clone()),
            Error::Request(e) => ("Server error", Value::String(e.to_string())),
        };
        envelope(self.status(), error, details)
    }
}

// Strip the URL so the api key in the query string never reaches logs or clients.
impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Request(error.without_url())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error_response(self.status(), self.envelope())
    }
}

pub fn envelope(status: StatusCode, error: &str, details: Value) -> Value {
    json!({
        "error": error,
        "status": status.as_u16(),
        "details": details,
    })
}

pub fn error_response(status: StatusCode, body: Value) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    )
        .into_response()
}
