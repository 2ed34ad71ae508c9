use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::outcome::QuizOutcome;

/// Append-only store of completed quiz results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn record_score(&self, user_id: Uuid, outcome: &QuizOutcome) -> Result<()>;
}

/// Read side of the score table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardQuery: Send + Sync {
    /// Best results first: score descending, then time ascending.
    async fn top_entries(&self, limit: i64) -> Result<Vec<LeaderboardEntry>>;
}

#[derive(Clone)]
pub struct ScoreService {
    pool: PgPool,
}

impl ScoreService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreStore for ScoreService {
    async fn record_score(&self, user_id: Uuid, outcome: &QuizOutcome) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quiz_scores (user_id, score, total_questions, time_taken_seconds, difficulty)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(outcome.score as i32)
        .bind(outcome.total_questions as i32)
        .bind(i32::try_from(outcome.time_taken_seconds).unwrap_or(i32::MAX))
        .bind(outcome.difficulty.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::PersistenceUnavailable(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LeaderboardQuery for ScoreService {
    async fn top_entries(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                COALESCE(p.username, 'Anonymous') AS username,
                s.score,
                s.total_questions,
                s.time_taken_seconds,
                s.completed_at
            FROM quiz_scores s
            LEFT JOIN profiles p ON p.user_id = s.user_id
            ORDER BY s.score DESC, s.time_taken_seconds ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::PersistenceUnavailable(e.to_string()))?;
        Ok(rows)
    }
}
