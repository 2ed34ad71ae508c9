use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::question::Difficulty;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub certificate_id: String,
    pub user_id: Uuid,
    pub username: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub difficulty: Difficulty,
    pub issued_at: DateTime<Utc>,
}

/// Row of the `certificates` table.
#[derive(Debug, Clone, FromRow)]
pub struct CertificateRow {
    pub certificate_id: String,
    pub user_id: Uuid,
    pub username: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub difficulty: String,
    pub issued_at: DateTime<Utc>,
}

impl TryFrom<CertificateRow> for Certificate {
    type Error = String;

    fn try_from(row: CertificateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            difficulty: row.difficulty.parse()?,
            certificate_id: row.certificate_id,
            user_id: row.user_id,
            username: row.username,
            score: row.score.max(0) as u32,
            total_questions: row.total_questions.max(0) as u32,
            percentage: row.percentage.clamp(0, 100) as u32,
            issued_at: row.issued_at,
        })
    }
}
