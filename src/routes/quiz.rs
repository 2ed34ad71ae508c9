use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::quiz_dto::{
        AdvanceResponse, FullscreenRequest, RevealedAnswer, SelectAnswerRequest, SessionView,
        StartQuizRequest,
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/quiz/sessions",
    request_body = StartQuizRequest,
    responses(
        (status = 201, description = "Quiz session started", body = SessionView),
        (status = 409, description = "Fullscreen is required"),
        (status = 422, description = "Not enough questions for the difficulty"),
        (status = 503, description = "Question source unavailable")
    )
)]
#[axum::debug_handler]
pub async fn start_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StartQuizRequest>,
) -> Result<impl IntoResponse> {
    let view = state
        .quiz
        .start_quiz(claims.user_id()?, payload.difficulty, payload.fullscreen)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/quiz/sessions/{id}",
    params(("id" = Uuid, Path, description = "Quiz session ID")),
    responses(
        (status = 200, description = "Current state of the session", body = SessionView),
        (status = 404, description = "Session not found")
    )
)]
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.quiz.session_status(claims.user_id()?, id)?))
}

#[utoipa::path(
    patch,
    path = "/api/quiz/sessions/{id}/answer",
    params(("id" = Uuid, Path, description = "Quiz session ID")),
    request_body = SelectAnswerRequest,
    responses(
        (status = 200, description = "Selection recorded", body = SessionView),
        (status = 409, description = "Answer already revealed or session not in progress")
    )
)]
#[axum::debug_handler]
pub async fn select_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.quiz.select_answer(claims.user_id()?, id, payload.option)?))
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/submit",
    params(("id" = Uuid, Path, description = "Quiz session ID")),
    responses(
        (status = 200, description = "Answer judged and revealed", body = RevealedAnswer),
        (status = 400, description = "No answer selected"),
        (status = 409, description = "Answer already revealed")
    )
)]
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.quiz.submit_answer(claims.user_id()?, id)?))
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/next",
    params(("id" = Uuid, Path, description = "Quiz session ID")),
    responses(
        (status = 200, description = "Next question (type = question) or final result (type = result)", body = AdvanceResponse),
        (status = 409, description = "Current answer not submitted yet")
    )
)]
#[axum::debug_handler]
pub async fn advance(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.quiz.advance(claims.user_id()?, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/abort",
    params(("id" = Uuid, Path, description = "Quiz session ID")),
    responses(
        (status = 204, description = "Session abandoned, no score recorded"),
        (status = 409, description = "Session not in progress")
    )
)]
#[axum::debug_handler]
pub async fn abort(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.quiz.abort(claims.user_id()?, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/fullscreen",
    params(("id" = Uuid, Path, description = "Quiz session ID")),
    request_body = FullscreenRequest,
    responses(
        (status = 200, description = "Fullscreen state updated", body = SessionView)
    )
)]
#[axum::debug_handler]
pub async fn set_fullscreen(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FullscreenRequest>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.quiz.set_fullscreen(claims.user_id()?, id, payload.active)?))
}
