//! Axum route handlers for browsing the question corpus.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Difficulty, Question, QuestionType};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

/// Enum value + human label pair for dropdown population.
#[derive(Debug, Serialize)]
pub struct LabeledValue {
    pub value: &'static str,
    pub label: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/questions
///
/// Full corpus including answers; a management surface, not a candidate one.
pub async fn handle_list_questions(State(state): State<AppState>) -> Json<Vec<Question>> {
    Json(state.bank.all().to_vec())
}

/// GET /api/v1/questions/types
pub async fn handle_list_types() -> Json<Vec<LabeledValue>> {
    Json(
        QuestionType::ALL
            .iter()
            .map(|t| LabeledValue {
                value: t.as_str(),
                label: t.label(),
            })
            .collect(),
    )
}

/// GET /api/v1/questions/difficulties
pub async fn handle_list_difficulties() -> Json<Vec<LabeledValue>> {
    Json(
        Difficulty::ALL
            .iter()
            .map(|d| LabeledValue {
                value: d.as_str(),
                label: d.label(),
            })
            .collect(),
    )
}

/// GET /api/v1/questions/:id
pub async fn handle_get_question(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<Json<Question>, AppError> {
    let question = state
        .bank
        .by_id(&question_id)
        .ok_or_else(|| AppError::NotFound(format!("Question {question_id} not found")))?;
    Ok(Json(question.clone()))
}

/// GET /api/v1/questions/type/:question_type
pub async fn handle_questions_by_type(
    State(state): State<AppState>,
    Path(question_type): Path<QuestionType>,
) -> Json<Vec<Question>> {
    Json(
        state
            .bank
            .by_type(question_type)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /api/v1/questions/difficulty/:difficulty
pub async fn handle_questions_by_difficulty(
    State(state): State<AppState>,
    Path(difficulty): Path<Difficulty>,
) -> Json<Vec<Question>> {
    Json(
        state
            .bank
            .by_difficulty(difficulty)
            .into_iter()
            .cloned()
            .collect(),
    )
}
