//! Axum route handlers for the interview lifecycle.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::NewSession;
use crate::models::{AnswerEvaluation, InterviewReport, QuestionDisplay, SessionStatus};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub candidate_name: Option<String>,
    pub position: Option<String>,
    pub resume_data: Option<Value>,
    pub jd_data: Option<Value>,
    pub question_count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub id: Uuid,
    pub candidate_name: Option<String>,
    pub position: Option<String>,
    pub status: SessionStatus,
    pub question_count: usize,
    pub current_question_index: usize,
    pub welcome_message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionInfoResponse {
    pub id: Uuid,
    pub candidate_name: Option<String>,
    pub position: Option<String>,
    pub status: SessionStatus,
    pub question_count: usize,
    pub current_question_index: usize,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CurrentQuestionResponse {
    pub current_index: usize,
    pub total_questions: usize,
    pub question: QuestionDisplay,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub current_question: Option<CurrentQuestionResponse>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: String,
    pub selected_option: Option<String>,
    pub explanation: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub evaluation: AnswerEvaluation,
    pub has_next_question: bool,
    pub next_question: Option<QuestionDisplay>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct CancelSessionResponse {
    pub cancelled: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interview/sessions
///
/// Creates a session with its question list fixed up front and returns the
/// welcome message shown before the first question.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, AppError> {
    let session = state
        .orchestrator
        .create_session(NewSession {
            candidate_name: request.candidate_name,
            position: request.position,
            resume_data: request.resume_data,
            jd_data: request.jd_data,
            question_count: request.question_count,
        })
        .await;

    let welcome_message = state.orchestrator.welcome_message(&session);

    Ok(Json(CreateSessionResponse {
        id: session.id,
        candidate_name: session.candidate_name,
        position: session.position,
        status: session.status,
        question_count: session.question_count,
        current_question_index: session.current_question_index,
        welcome_message,
        created_at: session.created_at,
    }))
}

/// POST /api/v1/interview/sessions/:id/start
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let (session, cursor) = state.orchestrator.start_interview(session_id).await?;

    Ok(Json(StartInterviewResponse {
        session_id: session.id,
        status: session.status,
        current_question: cursor.map(|c| CurrentQuestionResponse {
            current_index: c.current_index,
            total_questions: c.total_questions,
            question: c.question,
        }),
    }))
}

/// GET /api/v1/interview/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionInfoResponse>, AppError> {
    let session = state.orchestrator.get_session(session_id).await?;

    Ok(Json(SessionInfoResponse {
        id: session.id,
        candidate_name: session.candidate_name,
        position: session.position,
        status: session.status,
        question_count: session.question_count,
        current_question_index: session.current_question_index,
        created_at: session.created_at,
        completed_at: session.completed_at,
    }))
}

/// GET /api/v1/interview/sessions/:id/current-question
///
/// `null` when the session is not in progress or the list is exhausted.
pub async fn handle_current_question(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Option<CurrentQuestionResponse>>, AppError> {
    let cursor = state.orchestrator.get_current_question(session_id).await?;

    Ok(Json(cursor.map(|c| CurrentQuestionResponse {
        current_index: c.current_index,
        total_questions: c.total_questions,
        question: c.question,
    })))
}

/// POST /api/v1/interview/sessions/:id/submit-answer
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    if request.question_id.trim().is_empty() {
        return Err(AppError::Validation("question_id cannot be empty".to_string()));
    }

    let outcome = state
        .orchestrator
        .submit_answer(
            session_id,
            &request.question_id,
            request.selected_option,
            request.explanation,
        )
        .await?;

    Ok(Json(SubmitAnswerResponse {
        evaluation: outcome.evaluation,
        has_next_question: outcome.has_next,
        next_question: outcome.next_question,
    }))
}

/// GET /api/v1/interview/sessions/:id/feedback/:question_id
///
/// Conversational feedback for an already answered question, ready for TTS.
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path((session_id, question_id)): Path<(Uuid, String)>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let feedback = state
        .orchestrator
        .get_feedback_text(session_id, &question_id)
        .await?;

    Ok(Json(FeedbackResponse { feedback }))
}

/// GET /api/v1/interview/sessions/:id/report
///
/// Only available once the interview has completed.
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewReport>, AppError> {
    let report = state
        .orchestrator
        .generate_report(session_id)
        .await?
        .ok_or_else(|| {
            AppError::InvalidState(
                "report not available until the interview completes".to_string(),
            )
        })?;

    Ok(Json(report))
}

/// POST /api/v1/interview/sessions/:id/cancel
pub async fn handle_cancel_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CancelSessionResponse>, AppError> {
    let cancelled = state.orchestrator.cancel_session(session_id).await?;
    Ok(Json(CancelSessionResponse { cancelled }))
}
