use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardEntry {
    #[sqlx(default)]
    pub rank: i64,
    pub username: String,
    pub score: i32,
    pub total_questions: i32,
    pub time_taken_seconds: i32,
    pub completed_at: DateTime<Utc>,
}

/// Higher score first; equal scores rank the faster attempt first.
pub fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.time_taken_seconds.cmp(&b.time_taken_seconds))
}

/// Sorts, truncates to `limit` and assigns 1-based ranks.
pub fn rank_entries(mut entries: Vec<LeaderboardEntry>, limit: usize) -> Vec<LeaderboardEntry> {
    entries.sort_by(leaderboard_order);
    entries.truncate(limit);
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx as i64 + 1;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(username: &str, score: i32, time: i32) -> LeaderboardEntry {
        LeaderboardEntry {
            rank: 0,
            username: username.into(),
            score,
            total_questions: 10,
            time_taken_seconds: time,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn ties_on_score_are_broken_by_time() {
        let ranked = rank_entries(
            vec![entry("slow", 9, 300), entry("top", 10, 400), entry("fast", 9, 120)],
            20,
        );
        let names: Vec<_> = ranked.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, ["top", "fast", "slow"]);
        assert_eq!(ranked.iter().map(|e| e.rank).collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn ranking_is_truncated_to_limit() {
        let entries = (0..30).map(|i| entry("u", i, 100)).collect();
        let ranked = rank_entries(entries, 20);
        assert_eq!(ranked.len(), 20);
        assert_eq!(ranked[0].score, 29);
    }
}
