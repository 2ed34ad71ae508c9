use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::certificate::Certificate;
use crate::models::outcome::{Grade, QuizOutcome};
use crate::models::quiz_session::QuizSession;
use crate::utils::time::elapsed_seconds;
use crate::utils::token::generate_certificate_id;

/// Minimum percentage that earns a certificate. Deliberately above the
/// passing grade for a B.
pub const CERTIFICATE_THRESHOLD: u32 = 75;

pub struct GradingService;

impl GradingService {
    /// Derives the outcome from the session's recorded answers. The running
    /// counter kept for display is not consulted.
    pub fn compute_outcome(session: &QuizSession, completed_at: DateTime<Utc>) -> QuizOutcome {
        let total = session.questions().len() as u32;
        let score = session
            .answers()
            .iter()
            .filter(|a| a.revealed && a.is_correct)
            .count() as u32;
        let time_taken_seconds = elapsed_seconds(session.started_at(), completed_at);

        QuizOutcome {
            score,
            total_questions: total,
            time_taken_seconds,
            difficulty: session.difficulty(),
            percentage: Self::percentage(score, total),
        }
    }

    /// `round(100 * score / total)` with halves rounded up, in integers.
    pub fn percentage(score: u32, total: u32) -> u32 {
        if total == 0 {
            return 0;
        }
        let score = score.min(total) as u64;
        let total = total as u64;
        ((200 * score + total) / (2 * total)) as u32
    }

    pub fn grade_label(percentage: u32) -> Grade {
        match percentage {
            90..=u32::MAX => Grade::APlus,
            80..=89 => Grade::A,
            70..=79 => Grade::B,
            60..=69 => Grade::C,
            50..=59 => Grade::D,
            _ => Grade::F,
        }
    }

    pub fn is_certificate_eligible(percentage: u32) -> bool {
        percentage >= CERTIFICATE_THRESHOLD
    }

    pub fn issue_certificate(
        outcome: &QuizOutcome,
        username: &str,
        user_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> Result<Certificate> {
        if !Self::is_certificate_eligible(outcome.percentage) {
            return Err(Error::NotEligible {
                percentage: outcome.percentage,
            });
        }

        Ok(Certificate {
            certificate_id: generate_certificate_id(),
            user_id,
            username: username.to_string(),
            score: outcome.score,
            total_questions: outcome.total_questions,
            percentage: outcome.percentage,
            difficulty: outcome.difficulty,
            issued_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;

    fn outcome(score: u32) -> QuizOutcome {
        QuizOutcome {
            score,
            total_questions: 10,
            time_taken_seconds: 120,
            difficulty: Difficulty::Easy,
            percentage: GradingService::percentage(score, 10),
        }
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(GradingService::percentage(8, 10), 80);
        assert_eq!(GradingService::percentage(1, 3), 33);
        assert_eq!(GradingService::percentage(2, 3), 67);
        assert_eq!(GradingService::percentage(1, 8), 13);
        assert_eq!(GradingService::percentage(1, 200), 1);
        assert_eq!(GradingService::percentage(0, 10), 0);
        assert_eq!(GradingService::percentage(10, 10), 100);
        assert_eq!(GradingService::percentage(0, 0), 0);
    }

    #[test]
    fn percentage_stays_in_range() {
        for total in 1..=20 {
            for score in 0..=total {
                let p = GradingService::percentage(score, total);
                assert!(p <= 100);
                let exact = 100.0 * score as f64 / total as f64;
                assert!((p as f64 - exact).abs() <= 0.5);
            }
        }
    }

    #[test]
    fn grade_thresholds_are_inclusive_lower_bounds() {
        let cases = [
            (100, Grade::APlus),
            (90, Grade::APlus),
            (89, Grade::A),
            (80, Grade::A),
            (79, Grade::B),
            (70, Grade::B),
            (69, Grade::C),
            (60, Grade::C),
            (59, Grade::D),
            (50, Grade::D),
            (49, Grade::F),
            (0, Grade::F),
        ];
        for (p, grade) in cases {
            assert_eq!(GradingService::grade_label(p), grade, "percentage {p}");
        }
    }

    #[test]
    fn grades_never_improve_as_percentage_drops() {
        let rank = |g: Grade| match g {
            Grade::APlus => 5,
            Grade::A => 4,
            Grade::B => 3,
            Grade::C => 2,
            Grade::D => 1,
            Grade::F => 0,
        };
        for p in 1..=100 {
            assert!(rank(GradingService::grade_label(p)) >= rank(GradingService::grade_label(p - 1)));
        }
    }

    #[test]
    fn eligibility_is_monotonic() {
        let first = (0..=100).find(|p| GradingService::is_certificate_eligible(*p));
        assert_eq!(first, Some(CERTIFICATE_THRESHOLD));
        for p in CERTIFICATE_THRESHOLD..=100 {
            assert!(GradingService::is_certificate_eligible(p));
        }
    }

    #[test]
    fn scenario_b_passing_grade_without_certificate() {
        let o = outcome(7);
        assert_eq!(o.percentage, 70);
        assert_eq!(GradingService::grade_label(o.percentage), Grade::B);
        assert!(!GradingService::is_certificate_eligible(o.percentage));

        let err = GradingService::issue_certificate(&o, "alice", Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, Error::NotEligible { percentage: 70 }));
    }

    #[test]
    fn eligible_outcome_mints_certificate() {
        let user_id = Uuid::new_v4();
        let issued_at = Utc::now();
        let o = outcome(8);
        assert_eq!(GradingService::grade_label(o.percentage), Grade::A);

        let cert = GradingService::issue_certificate(&o, "alice", user_id, issued_at).unwrap();
        assert_eq!(cert.user_id, user_id);
        assert_eq!(cert.username, "alice");
        assert_eq!(cert.score, 8);
        assert_eq!(cert.percentage, 80);
        assert_eq!(cert.issued_at, issued_at);
        assert!(cert.certificate_id.starts_with("CSA-"));

        let again = GradingService::issue_certificate(&o, "alice", user_id, issued_at).unwrap();
        assert_ne!(cert.certificate_id, again.certificate_id);
    }
}
