pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    certificate_service::CertificateService,
    email_service::{verify_url, EmailService},
    profile_service::ProfileService,
    question_service::QuestionService,
    quiz_service::{Collaborators, QuizService},
    score_service::ScoreService,
};

#[derive(Clone)]
pub struct AppState {
    pub quiz: QuizService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        verify_url(&config.verify_base_url, "")?;

        let http_client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        let scores = Arc::new(ScoreService::new(pool.clone()));
        let collab = Collaborators {
            questions: Arc::new(QuestionService::new(pool.clone())),
            scores: scores.clone(),
            leaderboard: scores,
            certificates: Arc::new(CertificateService::new(pool.clone())),
            profiles: Arc::new(ProfileService::new(pool)),
            email: Arc::new(EmailService::new(
                http_client,
                config.resend_api_key.clone(),
                config.email_from.clone(),
                config.verify_base_url.clone(),
            )),
        };

        Ok(Self::from_service(QuizService::new(
            collab,
            config.certificate_policy,
            config.verify_base_url.clone(),
        )))
    }

    pub fn from_service(quiz: QuizService) -> Self {
        Self { quiz }
    }
}
