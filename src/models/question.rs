use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Level name printed on certificates and in emails.
    pub fn level_label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Beginner Level",
            Difficulty::Medium => "Intermediate Level",
            Difficulty::Hard => "Advanced Level",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    pub const ALL: [AnswerOption; 4] = [AnswerOption::A, AnswerOption::B, AnswerOption::C, AnswerOption::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        }
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerOption {
    type Err = String;

    /// Exact match only. Stored keys with stray whitespace or lowercase
    /// letters are treated as malformed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(AnswerOption::A),
            "B" => Ok(AnswerOption::B),
            "C" => Ok(AnswerOption::C),
            "D" => Ok(AnswerOption::D),
            other => Err(format!("'{}' is not one of A, B, C, D", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestionOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    pub options: QuestionOptions,
    /// Answer key exactly as stored. Kept raw so a malformed key can be
    /// reported when the question is judged.
    pub correct_answer: String,
    pub difficulty: Difficulty,
}

impl Question {
    pub fn correct_option(&self) -> Option<AnswerOption> {
        self.correct_answer.parse().ok()
    }
}

/// Row of the `quiz_questions` table.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub difficulty: String,
}

impl QuestionRow {
    pub fn into_question(self) -> Option<Question> {
        let difficulty = self.difficulty.parse().ok()?;
        Some(Question {
            id: self.id,
            prompt: self.question,
            options: QuestionOptions {
                a: self.option_a,
                b: self.option_b,
                c: self.option_c,
                d: self.option_d,
            },
            correct_answer: self.correct_answer,
            difficulty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(correct: &str, difficulty: &str) -> QuestionRow {
        QuestionRow {
            id: Uuid::new_v4(),
            question: "What does MFA stand for?".into(),
            option_a: "Multi-factor authentication".into(),
            option_b: "Main firewall access".into(),
            option_c: "Managed file archive".into(),
            option_d: "Malware filter agent".into(),
            correct_answer: correct.into(),
            difficulty: difficulty.into(),
        }
    }

    #[test]
    fn row_converts_into_question() {
        let q = row("A", "medium").into_question().unwrap();
        assert_eq!(q.difficulty, Difficulty::Medium);
        assert_eq!(q.correct_option(), Some(AnswerOption::A));
        assert_eq!(q.options.b, "Main firewall access");
    }

    #[test]
    fn malformed_answer_key_has_no_correct_option() {
        let q = row("E", "easy").into_question().unwrap();
        assert_eq!(q.correct_option(), None);
        let q = row("a", "easy").into_question().unwrap();
        assert_eq!(q.correct_option(), None);
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        assert!(row("A", "insane").into_question().is_none());
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
        let parsed: AnswerOption = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(parsed, AnswerOption::C);
    }
}
