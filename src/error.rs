use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::path::PathBuf;

/// Failures of the code/project evaluators. The idea pipeline never produces one.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Project path does not exist: {}", .0.display())]
    ProjectNotFound(PathBuf),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Client input problems on the evaluation paths all map to 400.
        let status = StatusCode::BAD_REQUEST;
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(value: axum::extract::multipart::MultipartError) -> Self {
        Self::BadRequest(value.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_not_found_message_names_the_path() {
        let err = ApiError::from(EvaluationError::ProjectNotFound(PathBuf::from("/nope")));
        assert_eq!(err.to_string(), "Project path does not exist: /nope");
    }

    #[test]
    fn every_api_error_is_a_400() {
        let resp = ApiError::BadRequest("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
