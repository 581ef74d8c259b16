use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};
use wq_core::quiz::HistoryItem;
use wq_core::{Error, QuizOutput};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub url: String,
}

/// Error body returned by every endpoint: `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, detail) = match &err {
            e if e.is_scrape_failure() => (StatusCode::BAD_REQUEST, format!("Scrape failed: {}", e)),
            e if e.is_generation_failure() => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("LLM generation failed: {}", e),
            ),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "Quiz not found".to_string()),
            Error::CorruptRecord { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Stored quiz JSON invalid: {}", message),
            ),
            e => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        if status.is_server_error() {
            error!("{}", detail);
        } else {
            warn!("{}", detail);
        }
        Self { status, detail }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        warn!("Rejected request body: {}", detail);
        Self { status: rejection.status(), detail }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        let detail = rejection.body_text();
        warn!("Rejected path: {}", detail);
        Self { status: rejection.status(), detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<QuizOutput>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.manager.generate(&request.url).await?))
}

pub async fn history(State(state): State<Arc<AppState>>) -> Result<Json<Vec<HistoryItem>>, ApiError> {
    Ok(Json(state.manager.history().await?))
}

pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.manager.get_quiz(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (Error::InvalidInput("ftp".into()), StatusCode::BAD_REQUEST, "Scrape failed: "),
            (Error::Fetch("404".into()), StatusCode::BAD_REQUEST, "Scrape failed: "),
            (Error::ContentNotFound("x".into()), StatusCode::BAD_REQUEST, "Scrape failed: "),
            (
                Error::generation(Error::InvalidModelOutput("no questions".into()), None),
                StatusCode::INTERNAL_SERVER_ERROR,
                "LLM generation failed: ",
            ),
            (Error::NotFound(7), StatusCode::NOT_FOUND, "Quiz not found"),
            (
                Error::CorruptRecord { id: 7, message: "expected value".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
                "Stored quiz JSON invalid: expected value",
            ),
            (Error::Storage("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR, "Storage error"),
        ];

        for (err, status, prefix) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert!(api.detail.starts_with(prefix), "{}", api.detail);
        }
    }

    #[test]
    fn test_generation_detail_keeps_cause() {
        let api = ApiError::from(Error::generation(
            Error::Inference("model 'x' returned 404 Not Found".into()),
            Some("Set MODEL_NAME".into()),
        ));
        assert!(api.detail.contains("404 Not Found"));
        assert!(api.detail.contains("Set MODEL_NAME"));
    }
}
