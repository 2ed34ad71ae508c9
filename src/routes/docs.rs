use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::certificate_dto::{CertificateView, IssueCertificateResponse, LeaderboardResponse};
use crate::dto::quiz_dto::{
    AdvanceResponse, AnswerView, FullscreenRequest, QuestionView, QuizResult, RevealedAnswer,
    SelectAnswerRequest, SessionStatus, SessionView, StartQuizRequest,
};
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::outcome::{Grade, QuizOutcome};
use crate::models::question::{AnswerOption, Difficulty, QuestionOptions};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::quiz::start_quiz,
        crate::routes::quiz::get_session,
        crate::routes::quiz::select_answer,
        crate::routes::quiz::submit_answer,
        crate::routes::quiz::advance,
        crate::routes::quiz::abort,
        crate::routes::quiz::set_fullscreen,
        crate::routes::certificate::issue_certificate,
        crate::routes::certificate::latest_certificate,
        crate::routes::certificate::verify_certificate,
        crate::routes::leaderboard::get_leaderboard,
    ),
    components(schemas(
        StartQuizRequest, SelectAnswerRequest, FullscreenRequest,
        SessionView, SessionStatus, QuestionView, AnswerView, RevealedAnswer, QuizResult,
        AdvanceResponse,
        CertificateView, IssueCertificateResponse, LeaderboardResponse, LeaderboardEntry,
        QuizOutcome, Grade, Difficulty, AnswerOption, QuestionOptions,
    )),
    tags((name = "quiz", description = "Cyber security awareness quiz"))
)]
pub struct ApiDoc;

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
