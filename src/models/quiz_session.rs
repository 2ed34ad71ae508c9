use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::services::grading_service::GradingService;

use super::answer::AnswerRecord;
use super::outcome::QuizOutcome;
use super::question::{AnswerOption, Difficulty, Question};

/// Number of questions drawn for every run.
pub const QUESTIONS_PER_QUIZ: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Completed(QuizOutcome),
    Aborted,
}

/// Result of a successful [`QuizSession::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the question at this index.
    Next(usize),
    Completed(QuizOutcome),
}

/// One run through the quiz.
///
/// Created by [`QuizSession::start`] and driven through
/// select → submit → advance for every question until it completes or is
/// aborted. Records before `current_index` are always revealed and only the
/// current record can still change.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    difficulty: Difficulty,
    questions: Vec<Question>,
    current_index: usize,
    answers: Vec<AnswerRecord>,
    correct_so_far: u32,
    started_at: DateTime<Utc>,
    fullscreen_active: bool,
    fullscreen_exits: u32,
    state: SessionState,
}

impl QuizSession {
    /// Draws [`QUESTIONS_PER_QUIZ`] questions of `difficulty` from `pool`
    /// uniformly at random without replacement and presents the first one.
    pub fn start<R: Rng + ?Sized>(
        pool: Vec<Question>,
        difficulty: Difficulty,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut candidates: Vec<Question> = pool
            .into_iter()
            .filter(|q| q.difficulty == difficulty)
            .collect();

        if candidates.len() < QUESTIONS_PER_QUIZ {
            return Err(Error::InsufficientQuestions {
                difficulty,
                available: candidates.len(),
                required: QUESTIONS_PER_QUIZ,
            });
        }

        candidates.shuffle(rng);
        candidates.truncate(QUESTIONS_PER_QUIZ);

        let first = AnswerRecord::presented(candidates[0].id);
        Ok(Self {
            id: Uuid::new_v4(),
            difficulty,
            questions: candidates,
            current_index: 0,
            answers: vec![first],
            correct_so_far: 0,
            started_at: now,
            fullscreen_active: true,
            fullscreen_exits: 0,
            state: SessionState::InProgress,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == SessionState::InProgress
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        match &self.state {
            SessionState::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Running count of correct answers, for display while in progress.
    pub fn correct_so_far(&self) -> u32 {
        self.correct_so_far
    }

    pub fn fullscreen_active(&self) -> bool {
        self.fullscreen_active
    }

    pub fn fullscreen_exits(&self) -> u32 {
        self.fullscreen_exits
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_answer(&self) -> &AnswerRecord {
        &self.answers[self.current_index]
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn set_fullscreen(&mut self, active: bool) {
        if self.fullscreen_active && !active {
            self.fullscreen_exits += 1;
        }
        self.fullscreen_active = active;
    }

    pub fn select_answer(&mut self, option: AnswerOption) -> Result<()> {
        self.ensure_in_progress()?;
        let record = &mut self.answers[self.current_index];
        if record.revealed {
            return Err(Error::AlreadyRevealed);
        }
        record.selected_option = Some(option);
        Ok(())
    }

    /// Judges the current selection. This is the only place correctness is
    /// decided; the record is frozen afterwards.
    pub fn submit_answer(&mut self) -> Result<&AnswerRecord> {
        self.ensure_in_progress()?;
        let question = &self.questions[self.current_index];
        let record = &mut self.answers[self.current_index];
        if record.revealed {
            return Err(Error::AlreadyRevealed);
        }
        let Some(selected) = record.selected_option else {
            return Err(Error::NoAnswerSelected);
        };

        let is_correct = match question.correct_option() {
            Some(correct) => selected == correct,
            None => {
                tracing::warn!(
                    target: "data_integrity",
                    session_id = %self.id,
                    question_id = %question.id,
                    correct_answer = %question.correct_answer,
                    "Malformed correct answer, scoring selection as incorrect"
                );
                false
            }
        };

        record.revealed = true;
        record.is_correct = is_correct;
        if is_correct {
            self.correct_so_far += 1;
        }
        Ok(&self.answers[self.current_index])
    }

    /// Moves past a revealed question. After the last one the session
    /// completes and the outcome is derived from the recorded answers.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance> {
        self.ensure_in_progress()?;
        if !self.current_answer().revealed {
            return Err(Error::AnswerNotSubmitted);
        }

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            let next_id = self.questions[self.current_index].id;
            self.answers.push(AnswerRecord::presented(next_id));
            return Ok(Advance::Next(self.current_index));
        }

        let outcome = GradingService::compute_outcome(self, now);
        self.state = SessionState::Completed(outcome.clone());
        Ok(Advance::Completed(outcome))
    }

    pub fn abort(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        self.state = SessionState::Aborted;
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<()> {
        if self.is_in_progress() {
            Ok(())
        } else {
            Err(Error::SessionNotActive)
        }
    }
}
