use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::certificate_dto::{LeaderboardParams, LeaderboardResponse, DEFAULT_LEADERBOARD_LIMIT},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(("limit" = Option<i64>, Query, description = "Number of entries, 1 to 100 (default 20)")),
    responses(
        (status = 200, description = "Best results, highest score then fastest time", body = LeaderboardResponse),
        (status = 400, description = "Invalid limit")
    )
)]
#[axum::debug_handler]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse> {
    params.validate()?;
    let limit = params.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let entries = state.quiz.leaderboard(limit).await?;
    Ok(Json(LeaderboardResponse { entries }))
}
