//! Interview report types: derived, immutable once produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::{Difficulty, QuestionType};

/// Per-question sub-report, zipped positionally from questions and answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionReport {
    pub question_title: String,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub is_correct: bool,
    pub score: i64,
    pub candidate_answer: String,
    pub correct_answer: String,
    pub evaluation_summary: String,
}

/// Final interview report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewReport {
    pub session_id: Uuid,
    pub candidate_name: Option<String>,
    pub position: Option<String>,

    pub total_score: i64,
    pub total_questions: usize,
    pub correct_count: usize,

    pub logic_ability: i64,
    pub expression_ability: i64,
    pub problem_solving: i64,

    pub question_reports: Vec<QuestionReport>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub overall_comment: String,
    pub recommendation: String,

    /// Interview duration in seconds.
    pub interview_duration: i64,
    pub created_at: DateTime<Utc>,
}
