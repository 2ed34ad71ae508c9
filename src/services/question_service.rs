use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::question::{Difficulty, Question, QuestionRow};

/// Supplies the question pool a quiz session samples from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_questions(&self, difficulty: Difficulty) -> Result<Vec<Question>>;
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionSource for QuestionService {
    async fn fetch_questions(&self, difficulty: Difficulty) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, question, option_a, option_b, option_c, option_d, correct_answer, difficulty
            FROM quiz_questions
            WHERE difficulty = $1
            "#,
        )
        .bind(difficulty.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let questions = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                let question = row.into_question();
                if question.is_none() {
                    tracing::warn!(target: "data_integrity", question_id = %id, "Skipping question with unknown difficulty");
                }
                question
            })
            .collect();

        Ok(questions)
    }
}
