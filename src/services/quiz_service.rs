use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::config::CertificatePolicy;
use crate::dto::certificate_dto::{CertificateView, IssueCertificateResponse};
use crate::dto::quiz_dto::{AdvanceResponse, QuizResult, RevealedAnswer, SessionView};
use crate::error::{Error, Result};
use crate::models::certificate::Certificate;
use crate::models::leaderboard::{rank_entries, LeaderboardEntry};
use crate::models::outcome::QuizOutcome;
use crate::models::question::{AnswerOption, Difficulty};
use crate::models::quiz_session::{Advance, QuizSession, SessionState};
use crate::services::certificate_service::CertificateStore;
use crate::services::email_service::{verify_url, Delivery, EmailDispatch};
use crate::services::grading_service::GradingService;
use crate::services::profile_service::{ProfileLookup, FALLBACK_USERNAME};
use crate::services::question_service::QuestionSource;
use crate::services::score_service::{LeaderboardQuery, ScoreStore};
use crate::utils::time::now;

/// Completed attempts stay available for certificate requests this long.
pub const COMPLETED_RETENTION_HOURS: i64 = 24;

/// Everything the quiz flow talks to outside of its own memory.
#[derive(Clone)]
pub struct Collaborators {
    pub questions: Arc<dyn QuestionSource>,
    pub scores: Arc<dyn ScoreStore>,
    pub leaderboard: Arc<dyn LeaderboardQuery>,
    pub certificates: Arc<dyn CertificateStore>,
    pub profiles: Arc<dyn ProfileLookup>,
    pub email: Arc<dyn EmailDispatch>,
}

enum Step {
    Next(SessionView),
    Done(QuizOutcome),
}

struct TrackedSession {
    user_id: Uuid,
    session: QuizSession,
    last_activity_at: DateTime<Utc>,
    certificate: Option<Certificate>,
    /// Held for the whole of a certificate request so one attempt never mints twice.
    issuance: Arc<AsyncMutex<()>>,
}

#[derive(Clone)]
pub struct QuizService {
    collab: Collaborators,
    policy: CertificatePolicy,
    verify_base_url: String,
    sessions: Arc<Mutex<HashMap<Uuid, TrackedSession>>>,
}

impl QuizService {
    pub fn new(collab: Collaborators, policy: CertificatePolicy, verify_base_url: String) -> Self {
        Self {
            collab,
            policy,
            verify_base_url,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, TrackedSession>>> {
        self.sessions
            .lock()
            .map_err(|_| Error::Internal("session registry poisoned".to_string()))
    }

    /// Runs `f` on the caller's session. Sessions owned by someone else are
    /// reported as missing.
    fn with_session<T>(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        f: impl FnOnce(&mut TrackedSession) -> Result<T>,
    ) -> Result<T> {
        let mut sessions = self.lock()?;
        let tracked = sessions
            .get_mut(&session_id)
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| Error::NotFound("Quiz session not found".to_string()))?;
        tracked.last_activity_at = now();
        f(tracked)
    }

    pub async fn start_quiz(
        &self,
        user_id: Uuid,
        difficulty: Difficulty,
        fullscreen: bool,
    ) -> Result<SessionView> {
        if !fullscreen {
            return Err(Error::FullscreenRequired);
        }

        let pool = self.collab.questions.fetch_questions(difficulty).await?;
        let started_at = now();
        let session = {
            let mut rng = rand::thread_rng();
            QuizSession::start(pool, difficulty, &mut rng, started_at)?
        };
        let view = SessionView::new(&session, started_at);

        let mut sessions = self.lock()?;
        sessions.retain(|_, t| !(t.user_id == user_id && t.session.is_in_progress()));
        sessions.insert(
            session.id(),
            TrackedSession {
                user_id,
                session,
                last_activity_at: started_at,
                certificate: None,
                issuance: Arc::new(AsyncMutex::new(())),
            },
        );

        tracing::info!(%user_id, session_id = %view.session_id, %difficulty, "Quiz session started");
        Ok(view)
    }

    pub fn session_status(&self, user_id: Uuid, session_id: Uuid) -> Result<SessionView> {
        self.with_session(user_id, session_id, |t| Ok(SessionView::new(&t.session, now())))
    }

    pub fn select_answer(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        option: AnswerOption,
    ) -> Result<SessionView> {
        self.with_session(user_id, session_id, |t| {
            ensure_fullscreen(&t.session)?;
            t.session.select_answer(option)?;
            Ok(SessionView::new(&t.session, now()))
        })
    }

    pub fn submit_answer(&self, user_id: Uuid, session_id: Uuid) -> Result<RevealedAnswer> {
        self.with_session(user_id, session_id, |t| {
            ensure_fullscreen(&t.session)?;
            t.session.submit_answer()?;
            Ok(RevealedAnswer::new(&t.session))
        })
    }

    /// Moves to the next question, or completes the session and records the
    /// score. A failed save is reported through `saved` and does not undo the
    /// completion.
    pub async fn advance(&self, user_id: Uuid, session_id: Uuid) -> Result<AdvanceResponse> {
        let step = self.with_session(user_id, session_id, |t| {
            ensure_fullscreen(&t.session)?;
            match t.session.advance(now())? {
                Advance::Next(_) => Ok(Step::Next(SessionView::new(&t.session, now()))),
                Advance::Completed(outcome) => Ok(Step::Done(outcome)),
            }
        })?;

        let outcome = match step {
            Step::Next(view) => return Ok(AdvanceResponse::Question(view)),
            Step::Done(outcome) => outcome,
        };

        tracing::info!(
            %user_id,
            %session_id,
            score = outcome.score,
            total = outcome.total_questions,
            percentage = outcome.percentage,
            time_taken_seconds = outcome.time_taken_seconds,
            "Quiz session completed"
        );

        let saved = match self.collab.scores.record_score(user_id, &outcome).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%user_id, %session_id, error = %e, "Failed to save quiz score");
                false
            }
        };

        Ok(AdvanceResponse::Result(QuizResult::new(session_id, outcome, saved)))
    }

    pub fn abort(&self, user_id: Uuid, session_id: Uuid) -> Result<()> {
        self.with_session(user_id, session_id, |t| t.session.abort())?;
        tracing::info!(%user_id, %session_id, "Quiz session aborted");
        Ok(())
    }

    pub fn set_fullscreen(&self, user_id: Uuid, session_id: Uuid, active: bool) -> Result<SessionView> {
        self.with_session(user_id, session_id, |t| {
            let was_active = t.session.fullscreen_active();
            t.session.set_fullscreen(active);
            if was_active && !active {
                tracing::info!(
                    %user_id,
                    %session_id,
                    exits = t.session.fullscreen_exits(),
                    "Participant left fullscreen"
                );
            }
            Ok(SessionView::new(&t.session, now()))
        })
    }

    /// Issues (or reuses) the certificate for a completed session and emails
    /// it when the caller's address is known. Requests for the same session
    /// are served one at a time; later ones get the stored certificate.
    pub async fn issue_certificate(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        user_email: Option<&str>,
    ) -> Result<IssueCertificateResponse> {
        let (outcome, gate) = self.with_session(user_id, session_id, |t| {
            let outcome = completed_outcome(&t.session)?;
            Ok((outcome, t.issuance.clone()))
        })?;

        if !GradingService::is_certificate_eligible(outcome.percentage) {
            return Err(Error::NotEligible {
                percentage: outcome.percentage,
            });
        }

        let _issuing = gate.lock().await;
        let existing = self.with_session(user_id, session_id, |t| Ok(t.certificate.clone()))?;
        if let Some(certificate) = existing {
            return self.reused(certificate);
        }

        if self.policy == CertificatePolicy::PerUser {
            if let Some(certificate) = self.collab.certificates.find_latest_certificate(user_id).await? {
                self.remember_certificate(user_id, session_id, &certificate);
                return self.reused(certificate);
            }
        }

        let username = match self.collab.profiles.get_username(user_id).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Profile lookup failed, using fallback name");
                FALLBACK_USERNAME.to_string()
            }
        };

        let certificate = GradingService::issue_certificate(&outcome, &username, user_id, now())?;
        self.collab.certificates.save_certificate(&certificate).await?;
        self.remember_certificate(user_id, session_id, &certificate);
        tracing::info!(
            %user_id,
            %session_id,
            certificate_id = %certificate.certificate_id,
            "Certificate issued"
        );

        let email_sent = match user_email {
            Some(email) => match self.collab.email.send_certificate_email(email, &certificate).await {
                Ok(Delivery::Sent) => true,
                Ok(Delivery::Skipped) => false,
                Err(e) => {
                    tracing::warn!(
                        certificate_id = %certificate.certificate_id,
                        error = %e,
                        "Failed to send certificate email"
                    );
                    false
                }
            },
            None => {
                tracing::info!(%user_id, "No email address in token, certificate email skipped");
                false
            }
        };

        Ok(IssueCertificateResponse {
            verify_url: verify_url(&self.verify_base_url, &certificate.certificate_id)?.to_string(),
            certificate: CertificateView::from(&certificate),
            reused: false,
            email_sent,
        })
    }

    fn reused(&self, certificate: Certificate) -> Result<IssueCertificateResponse> {
        Ok(IssueCertificateResponse {
            verify_url: verify_url(&self.verify_base_url, &certificate.certificate_id)?.to_string(),
            certificate: CertificateView::from(&certificate),
            reused: true,
            email_sent: false,
        })
    }

    /// The certificate is already persisted at this point, so a session that
    /// vanished meanwhile is only logged.
    fn remember_certificate(&self, user_id: Uuid, session_id: Uuid, certificate: &Certificate) {
        let remembered = self.with_session(user_id, session_id, |t| {
            t.certificate = Some(certificate.clone());
            Ok(())
        });
        if let Err(e) = remembered {
            tracing::warn!(
                %session_id,
                certificate_id = %certificate.certificate_id,
                error = %e,
                "Could not attach certificate to session"
            );
        }
    }

    pub async fn latest_certificate(&self, user_id: Uuid) -> Result<CertificateView> {
        self.collab
            .certificates
            .find_latest_certificate(user_id)
            .await?
            .map(|c| CertificateView::from(&c))
            .ok_or_else(|| Error::NotFound("No certificate found".to_string()))
    }

    /// Public verification. Unknown ids and store failures look the same to
    /// the caller.
    pub async fn verify_certificate(&self, certificate_id: &str) -> Result<CertificateView> {
        let certificate_id = certificate_id.trim();
        let not_found = || Error::NotFound("Certificate not found".to_string());
        if certificate_id.is_empty() {
            return Err(not_found());
        }

        match self.collab.certificates.find_certificate_by_id(certificate_id).await {
            Ok(Some(certificate)) => Ok(CertificateView::from(&certificate)),
            Ok(None) => {
                tracing::info!(%certificate_id, "Certificate verification miss");
                Err(not_found())
            }
            Err(e) => {
                tracing::error!(%certificate_id, error = %e, "Certificate store unavailable during verification");
                Err(not_found())
            }
        }
    }

    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let entries = self.collab.leaderboard.top_entries(limit).await?;
        Ok(rank_entries(entries, limit.max(0) as usize))
    }

    /// Drops sessions idle longer than `max_idle` and completed attempts older
    /// than the retention window. Evicted live sessions count as abandoned and
    /// leave no score behind. Returns the number of sessions removed.
    pub fn sweep(&self, at: DateTime<Utc>, max_idle: Duration) -> Result<usize> {
        let retention = Duration::hours(COMPLETED_RETENTION_HOURS);
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|session_id, t| {
            let idle = at - t.last_activity_at;
            let keep = match t.session.state() {
                SessionState::Completed(_) => idle <= retention,
                SessionState::InProgress | SessionState::Aborted => idle <= max_idle,
            };
            if !keep && t.session.is_in_progress() {
                tracing::info!(%session_id, user_id = %t.user_id, "Evicting idle quiz session");
            }
            keep
        });
        Ok(before - sessions.len())
    }

    pub fn live_sessions(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

fn ensure_fullscreen(session: &QuizSession) -> Result<()> {
    if session.is_in_progress() && !session.fullscreen_active() {
        return Err(Error::FullscreenRequired);
    }
    Ok(())
}

fn completed_outcome(session: &QuizSession) -> Result<QuizOutcome> {
    session
        .outcome()
        .cloned()
        .ok_or_else(|| Error::BadRequest("Finish the quiz before requesting a certificate".to_string()))
}
