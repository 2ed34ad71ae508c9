use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::question::AnswerOption;

/// Answer state for one question position of a quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: Uuid,
    pub selected_option: Option<AnswerOption>,
    pub is_correct: bool,
    pub revealed: bool,
}

impl AnswerRecord {
    pub fn presented(question_id: Uuid) -> Self {
        Self {
            question_id,
            selected_option: None,
            is_correct: false,
            revealed: false,
        }
    }
}
