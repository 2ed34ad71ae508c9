#![allow(dead_code)]

use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use cyber_quiz_backend::config::{get_config, init_config, CertificatePolicy};
use cyber_quiz_backend::error::{Error, Result};
use cyber_quiz_backend::middleware::auth::Claims;
use cyber_quiz_backend::models::certificate::Certificate;
use cyber_quiz_backend::models::leaderboard::LeaderboardEntry;
use cyber_quiz_backend::models::outcome::QuizOutcome;
use cyber_quiz_backend::models::question::{Difficulty, Question, QuestionOptions};
use cyber_quiz_backend::routes::build_router;
use cyber_quiz_backend::services::certificate_service::CertificateStore;
use cyber_quiz_backend::services::email_service::{Delivery, EmailDispatch};
use cyber_quiz_backend::services::profile_service::{ProfileLookup, FALLBACK_USERNAME};
use cyber_quiz_backend::services::question_service::QuestionSource;
use cyber_quiz_backend::services::quiz_service::{Collaborators, QuizService};
use cyber_quiz_backend::services::score_service::{LeaderboardQuery, ScoreStore};
use cyber_quiz_backend::AppState;

static INIT: Once = Once::new();

pub fn init_test_config() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        env::set_var("DATABASE_URL", "postgres://localhost/cyber_quiz_test");
        env::set_var("JWT_SECRET", "test_secret_key");
        env::set_var("PUBLIC_RPS", "1000");
        env::set_var("VERIFY_BASE_URL", "https://quiz.example.com/verify/");
        init_config().expect("init config");
    });
}

pub fn bearer(user_id: Uuid, email: Option<&str>) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_config().jwt_secret.as_bytes()),
    )
    .expect("sign token");
    format!("Bearer {}", token)
}

/// Every question's key is `A`.
pub fn question_bank(per_difficulty: usize) -> Vec<Question> {
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        .into_iter()
        .flat_map(|difficulty| {
            (0..per_difficulty).map(move |i| Question {
                id: Uuid::new_v4(),
                prompt: format!("{} question {}", difficulty, i + 1),
                options: QuestionOptions {
                    a: "Report it to IT security".into(),
                    b: "Click the link".into(),
                    c: "Reply with your password".into(),
                    d: "Forward it to colleagues".into(),
                },
                correct_answer: "A".into(),
                difficulty,
            })
        })
        .collect()
}

/// In-memory stand-in for the database and the mail provider.
#[derive(Default)]
pub struct FakeBackend {
    pub questions: Vec<Question>,
    pub profiles: Mutex<HashMap<Uuid, String>>,
    pub scores: Mutex<Vec<(Uuid, QuizOutcome)>>,
    pub certificates: Mutex<Vec<Certificate>>,
    pub sent_emails: Mutex<Vec<(String, String)>>,
    pub stores_down: bool,
}

impl FakeBackend {
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Default::default()
        }
    }

    pub fn add_profile(&self, user_id: Uuid, username: &str) {
        self.profiles.lock().unwrap().insert(user_id, username.to_string());
    }

    fn check_up(&self) -> Result<()> {
        if self.stores_down {
            return Err(Error::PersistenceUnavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionSource for FakeBackend {
    async fn fetch_questions(&self, difficulty: Difficulty) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScoreStore for FakeBackend {
    async fn record_score(&self, user_id: Uuid, outcome: &QuizOutcome) -> Result<()> {
        self.check_up()?;
        self.scores.lock().unwrap().push((user_id, outcome.clone()));
        Ok(())
    }
}

#[async_trait]
impl LeaderboardQuery for FakeBackend {
    async fn top_entries(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        self.check_up()?;
        let profiles = self.profiles.lock().unwrap();
        let entries = self
            .scores
            .lock()
            .unwrap()
            .iter()
            .map(|(user_id, o)| LeaderboardEntry {
                rank: 0,
                username: profiles
                    .get(user_id)
                    .cloned()
                    .unwrap_or_else(|| "Anonymous".to_string()),
                score: o.score as i32,
                total_questions: o.total_questions as i32,
                time_taken_seconds: o.time_taken_seconds as i32,
                completed_at: Utc::now(),
            })
            .take(limit as usize)
            .collect();
        Ok(entries)
    }
}

#[async_trait]
impl CertificateStore for FakeBackend {
    async fn find_latest_certificate(&self, user_id: Uuid) -> Result<Option<Certificate>> {
        self.check_up()?;
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .max_by_key(|c| c.issued_at)
            .cloned())
    }

    async fn save_certificate(&self, certificate: &Certificate) -> Result<()> {
        self.check_up()?;
        self.certificates.lock().unwrap().push(certificate.clone());
        Ok(())
    }

    async fn find_certificate_by_id(&self, certificate_id: &str) -> Result<Option<Certificate>> {
        self.check_up()?;
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.certificate_id == certificate_id)
            .cloned())
    }
}

#[async_trait]
impl ProfileLookup for FakeBackend {
    async fn get_username(&self, user_id: Uuid) -> Result<String> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| FALLBACK_USERNAME.to_string()))
    }
}

#[async_trait]
impl EmailDispatch for FakeBackend {
    async fn send_certificate_email(&self, user_email: &str, certificate: &Certificate) -> Result<Delivery> {
        self.sent_emails
            .lock()
            .unwrap()
            .push((user_email.to_string(), certificate.certificate_id.clone()));
        Ok(Delivery::Sent)
    }
}

pub fn app(backend: Arc<FakeBackend>, policy: CertificatePolicy) -> Router {
    init_test_config();
    let collab = Collaborators {
        questions: backend.clone(),
        scores: backend.clone(),
        leaderboard: backend.clone(),
        certificates: backend.clone(),
        profiles: backend.clone(),
        email: backend,
    };
    let quiz = QuizService::new(collab, policy, get_config().verify_base_url.clone());
    build_router(AppState::from_service(quiz), get_config().public_rps)
}
