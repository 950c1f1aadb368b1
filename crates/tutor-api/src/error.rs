use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tutor_exercise::RewardError;
use tutor_wordbank::WordBankError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Submission not ready: expected {expected} selections, got {actual}")]
    NotReady { expected: usize, actual: usize },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    WordBank(#[from] WordBankError),
    #[error(transparent)]
    Reward(#[from] RewardError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotReady { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::WordBank(e) if e.is_not_ready() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::WordBank(
                WordBankError::UnknownDisplayKey(_) | WordBankError::DuplicateSelection(_),
            ) => StatusCode::BAD_REQUEST,
            Self::WordBank(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Reward(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::NotReady {
                expected: 3,
                actual: 1
            }
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(WordBankError::UnknownDisplayKey("x-1".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(WordBankError::IncompleteSubmission {
                expected: 2,
                actual: 0
            })
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(RewardError::Unavailable("down".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Conflict("again".to_string()).status(),
            StatusCode::CONFLICT
        );
    }
}
