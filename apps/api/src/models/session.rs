//! Interview session aggregate and answer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::Question;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Result of scoring one answer. `score` is clamped to 0..=100 at
/// construction time by both evaluation paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub is_correct: bool,
    pub score: i64,
    pub feedback: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub key_points_hit: Vec<String>,
    #[serde(default)]
    pub key_points_missed: Vec<String>,
}

/// One submitted answer. Immutable once appended to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub selected_option: Option<String>,
    pub explanation: String,
    pub evaluation: AnswerEvaluation,
    pub submitted_at: DateTime<Utc>,
}

/// The central mutable aggregate. Owned exclusively by the orchestrator's
/// session table; mutation happens only under that table's per-session lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: Uuid,
    pub candidate_name: Option<String>,
    pub position: Option<String>,
    pub status: SessionStatus,
    /// Fixed at creation: the length of `questions`.
    pub question_count: usize,
    /// Monotonic, 0-based; never exceeds `question_count`.
    pub current_question_index: usize,
    pub questions: Vec<Question>,
    pub answers: Vec<AnswerRecord>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InterviewSession {
    pub fn new(
        candidate_name: Option<String>,
        position: Option<String>,
        questions: Vec<Question>,
    ) -> Self {
        InterviewSession {
            id: Uuid::new_v4(),
            candidate_name,
            position,
            status: SessionStatus::Pending,
            question_count: questions.len(),
            current_question_index: 0,
            questions,
            answers: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// The question at the current index, if the session still has one.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    /// Interview duration in seconds; 0 unless both endpoints are known.
    pub fn duration_secs(&self) -> i64 {
        match self.completed_at {
            Some(completed) => (completed - self.created_at).num_seconds().max(0),
            None => 0,
        }
    }
}
