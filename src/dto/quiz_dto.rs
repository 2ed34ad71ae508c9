use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::answer::AnswerRecord;
use crate::models::outcome::{Grade, QuizOutcome};
use crate::models::question::{AnswerOption, Difficulty, Question, QuestionOptions};
use crate::models::quiz_session::{QuizSession, SessionState};
use crate::services::grading_service::GradingService;
use crate::utils::time::{elapsed_seconds, format_duration};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartQuizRequest {
    pub difficulty: Difficulty,
    /// Whether the client is already in fullscreen mode.
    pub fullscreen: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectAnswerRequest {
    pub option: AnswerOption,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FullscreenRequest {
    pub active: bool,
}

/// A question as shown to the participant. Carries no answer key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionView {
    pub id: Uuid,
    /// 1-based position within the session.
    pub number: usize,
    pub prompt: String,
    pub options: QuestionOptions,
}

impl QuestionView {
    fn new(question: &Question, index: usize) -> Self {
        Self {
            id: question.id,
            number: index + 1,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerView {
    pub selected_option: Option<AnswerOption>,
    pub revealed: bool,
    /// Only present once the answer has been submitted.
    pub is_correct: Option<bool>,
    pub correct_option: Option<String>,
}

impl AnswerView {
    fn new(record: &AnswerRecord, question: &Question) -> Self {
        Self {
            selected_option: record.selected_option,
            revealed: record.revealed,
            is_correct: record.revealed.then_some(record.is_correct),
            correct_option: record.revealed.then(|| question.correct_answer.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Aborted,
}

impl From<&SessionState> for SessionStatus {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::InProgress => SessionStatus::InProgress,
            SessionState::Completed(_) => SessionStatus::Completed,
            SessionState::Aborted => SessionStatus::Aborted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub session_id: Uuid,
    pub difficulty: Difficulty,
    pub status: SessionStatus,
    pub total_questions: usize,
    pub correct_so_far: u32,
    /// Advisory only. The final time is taken when the session completes.
    pub elapsed_seconds: i64,
    pub fullscreen_active: bool,
    pub fullscreen_exits: u32,
    pub question: QuestionView,
    pub answer: AnswerView,
}

impl SessionView {
    pub fn new(session: &QuizSession, now: DateTime<Utc>) -> Self {
        let index = session.current_index();
        let question = session.current_question();
        Self {
            session_id: session.id(),
            difficulty: session.difficulty(),
            status: SessionStatus::from(session.state()),
            total_questions: session.questions().len(),
            correct_so_far: session.correct_so_far(),
            elapsed_seconds: elapsed_seconds(session.started_at(), now),
            fullscreen_active: session.fullscreen_active(),
            fullscreen_exits: session.fullscreen_exits(),
            question: QuestionView::new(question, index),
            answer: AnswerView::new(session.current_answer(), question),
        }
    }
}

/// Feedback for a submitted answer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevealedAnswer {
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub selected_option: Option<AnswerOption>,
    pub correct_option: String,
    pub is_correct: bool,
    pub correct_so_far: u32,
    pub is_last_question: bool,
}

impl RevealedAnswer {
    pub fn new(session: &QuizSession) -> Self {
        let record = session.current_answer();
        Self {
            session_id: session.id(),
            question_id: record.question_id,
            selected_option: record.selected_option,
            correct_option: session.current_question().correct_answer.clone(),
            is_correct: record.is_correct,
            correct_so_far: session.correct_so_far(),
            is_last_question: session.is_last_question(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizResult {
    pub session_id: Uuid,
    pub outcome: QuizOutcome,
    pub grade: Grade,
    pub grade_message: String,
    pub time_display: String,
    pub certificate_eligible: bool,
    /// False when the score could not be recorded. The result stands either way.
    pub saved: bool,
}

impl QuizResult {
    pub fn new(session_id: Uuid, outcome: QuizOutcome, saved: bool) -> Self {
        let grade = GradingService::grade_label(outcome.percentage);
        Self {
            session_id,
            grade,
            grade_message: grade.message().to_string(),
            time_display: format_duration(outcome.time_taken_seconds),
            certificate_eligible: GradingService::is_certificate_eligible(outcome.percentage),
            saved,
            outcome,
        }
    }
}

/// Response of the advance endpoint: either the next question or the final result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdvanceResponse {
    Question(SessionView),
    Result(QuizResult),
}
