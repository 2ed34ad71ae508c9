use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::question::Difficulty;

/// Final, immutable result of a completed quiz session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuizOutcome {
    pub score: u32,
    pub total_questions: u32,
    pub time_taken_seconds: i64,
    pub difficulty: Difficulty,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Grade::APlus => "Outstanding! You're a Cyber Security Expert!",
            Grade::A => "Excellent! Great cybersecurity knowledge!",
            Grade::B => "Good job! You're cyber aware!",
            Grade::C => "Not bad! Keep learning about cyber security!",
            Grade::D => "You need more practice!",
            Grade::F => "Time to brush up on cyber security basics!",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
