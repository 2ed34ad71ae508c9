use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::certificate::Certificate;
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::question::Difficulty;

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 20;

/// Public view of a certificate. The owner's user id is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CertificateView {
    pub certificate_id: String,
    pub username: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub difficulty: Difficulty,
    pub level: String,
    pub issued_at: DateTime<Utc>,
}

impl From<&Certificate> for CertificateView {
    fn from(c: &Certificate) -> Self {
        Self {
            certificate_id: c.certificate_id.clone(),
            username: c.username.clone(),
            score: c.score,
            total_questions: c.total_questions,
            percentage: c.percentage,
            difficulty: c.difficulty,
            level: c.difficulty.level_label().to_string(),
            issued_at: c.issued_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueCertificateResponse {
    pub certificate: CertificateView,
    /// True when an existing certificate was returned instead of a new one.
    pub reused: bool,
    pub email_sent: bool,
    pub verify_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LeaderboardParams {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}
