pub mod certificate;
pub mod docs;
pub mod health;
pub mod leaderboard;
pub mod quiz;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::require_bearer_auth, cors::quiz_cors, rate_limit};
use crate::AppState;

/// Full HTTP surface. Quiz and personal certificate routes need a bearer
/// token; leaderboard and verification are public and rate limited.
pub fn build_router(state: AppState, public_rps: u32) -> Router {
    let quiz_api = Router::new()
        .route("/api/quiz/sessions", post(quiz::start_quiz))
        .route("/api/quiz/sessions/:id", get(quiz::get_session))
        .route("/api/quiz/sessions/:id/answer", patch(quiz::select_answer))
        .route("/api/quiz/sessions/:id/submit", post(quiz::submit_answer))
        .route("/api/quiz/sessions/:id/next", post(quiz::advance))
        .route("/api/quiz/sessions/:id/abort", post(quiz::abort))
        .route("/api/quiz/sessions/:id/fullscreen", post(quiz::set_fullscreen))
        .route(
            "/api/quiz/sessions/:id/certificate",
            post(certificate::issue_certificate),
        )
        .route(
            "/api/certificates/me/latest",
            get(certificate::latest_certificate),
        )
        .layer(middleware::from_fn(require_bearer_auth));

    let public_api = Router::new()
        .route("/api/leaderboard", get(leaderboard::get_leaderboard))
        .route(
            "/api/certificates/:certificate_id",
            get(certificate::verify_certificate),
        )
        .layer(middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(public_rps),
            rate_limit::rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(docs::openapi_json))
        .merge(quiz_api)
        .merge(public_api)
        .with_state(state)
        .layer(quiz_cors())
        .layer(TraceLayer::new_for_http())
}
