use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::models::question::Difficulty;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not enough {difficulty} questions: {available} available, {required} required")]
    InsufficientQuestions {
        difficulty: Difficulty,
        available: usize,
        required: usize,
    },

    #[error("Please select an answer")]
    NoAnswerSelected,

    #[error("The current question has already been answered")]
    AlreadyRevealed,

    #[error("Submit an answer before moving on")]
    AnswerNotSubmitted,

    #[error("This quiz session is no longer in progress")]
    SessionNotActive,

    #[error("Fullscreen is required for this quiz")]
    FullscreenRequired,

    #[error("A score of {percentage}% is not eligible for a certificate")]
    NotEligible { percentage: u32 },

    #[error("Question source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code sent to clients next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::BadRequest(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::NotFound(_) => "not_found",
            Error::InsufficientQuestions { .. } => "insufficient_questions",
            Error::NoAnswerSelected => "no_answer_selected",
            Error::AlreadyRevealed => "already_revealed",
            Error::AnswerNotSubmitted => "answer_not_submitted",
            Error::SessionNotActive => "session_not_active",
            Error::FullscreenRequired => "fullscreen_required",
            Error::NotEligible { .. } => "not_eligible",
            Error::SourceUnavailable(_) => "source_unavailable",
            Error::PersistenceUnavailable(_) => "persistence_unavailable",
            Error::EmailDelivery(_) => "email_delivery_failed",
            Error::Validation(_) => "validation_error",
            Error::Json(_) => "invalid_json",
            Error::Database(_) | Error::Anyhow(_) | Error::Reqwest(_) | Error::Internal(_) => {
                "internal_error"
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let code = self.code();
        let (status, message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::InsufficientQuestions { .. } => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Error::NoAnswerSelected => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::AlreadyRevealed
            | Error::AnswerNotSubmitted
            | Error::SessionNotActive
            | Error::FullscreenRequired => (StatusCode::CONFLICT, self.to_string()),
            Error::NotEligible { .. } => (StatusCode::FORBIDDEN, self.to_string()),
            Error::SourceUnavailable(msg) => {
                tracing::error!("Question source unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Failed to load questions, please try again".to_string(),
                )
            }
            Error::PersistenceUnavailable(msg) => {
                tracing::error!("Persistence unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage is temporarily unavailable, please try again".to_string(),
                )
            }
            Error::EmailDelivery(msg) => (StatusCode::BAD_GATEWAY, msg),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Reqwest(err) => (StatusCode::BAD_GATEWAY, format!("External service error: {}", err)),
            other => {
                tracing::error!("Unhandled error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": code, "message": message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
