use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::names;

/// A stored quiz. Quizzes live as JSON files in the category tree and this
/// shape is both the wire format and the on-disk format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    pub topic: String,
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_config: Option<PoolConfig>,
}

/// Present when a quiz carries more questions than one game should use:
/// each attempt samples `questions_per_game` from the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    pub pool_size: u32,
    pub questions_per_game: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    SingleAnswer,
    MultipleAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub comment: String,
}

/// The stable address of a quiz document within the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizLocation {
    pub category: String,
    pub subcategory: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    Immediate,
    Summary,
}

impl QuizMode {
    /// How long the client should linger on feedback before the next
    /// question. Pure pacing, not a correctness concern.
    pub fn advance_delay(self) -> Duration {
        match self {
            QuizMode::Immediate => names::IMMEDIATE_FEEDBACK_DELAY,
            QuizMode::Summary => names::SUMMARY_ADVANCE_DELAY,
        }
    }
}

/// One submission during play. Indices refer to the answer order in the
/// stored document, never to the shuffled presentation order.
#[derive(Debug, Clone)]
pub struct UserAnswer {
    pub original_question_index: usize,
    pub selected_answer_indices: BTreeSet<usize>,
    pub correct: bool,
}

/// A finished attempt as persisted to history. Questions and answers are
/// snapshotted as text so later edits to the quiz do not rewrite the past.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub id: String,
    pub user: String,
    pub started_at: DateTime<Utc>,
    pub quiz_location: QuizLocation,
    pub mode: QuizMode,
    pub duration_seconds: u64,
    pub answered_questions: Vec<AnsweredQuestion>,
    pub score: Score,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub user_answer_texts: Vec<String>,
    pub correct_answer_texts: Vec<String>,
    pub correct: bool,
    pub original_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

impl Score {
    /// Percentage is rounded to the nearest integer. An empty attempt
    /// scores zero rather than dividing by zero.
    pub fn new(correct: u32, total: u32) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (correct * 100 + total / 2) / total
        };
        Self {
            correct,
            total,
            percentage,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub last_used: DateTime<Utc>,
}
