pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::bank::handlers as bank_handlers;
use crate::interview::handlers as interview_handlers;
use crate::speech::handlers as speech_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Question bank API
        .route(
            "/api/v1/questions",
            get(bank_handlers::handle_list_questions),
        )
        // Fixed segments must register before the `:id` capture.
        .route(
            "/api/v1/questions/types",
            get(bank_handlers::handle_list_types),
        )
        .route(
            "/api/v1/questions/difficulties",
            get(bank_handlers::handle_list_difficulties),
        )
        .route(
            "/api/v1/questions/type/:question_type",
            get(bank_handlers::handle_questions_by_type),
        )
        .route(
            "/api/v1/questions/difficulty/:difficulty",
            get(bank_handlers::handle_questions_by_difficulty),
        )
        .route(
            "/api/v1/questions/:id",
            get(bank_handlers::handle_get_question),
        )
        // Interview lifecycle API
        .route(
            "/api/v1/interview/sessions",
            post(interview_handlers::handle_create_session),
        )
        .route(
            "/api/v1/interview/sessions/:id",
            get(interview_handlers::handle_get_session),
        )
        .route(
            "/api/v1/interview/sessions/:id/start",
            post(interview_handlers::handle_start_interview),
        )
        .route(
            "/api/v1/interview/sessions/:id/current-question",
            get(interview_handlers::handle_current_question),
        )
        .route(
            "/api/v1/interview/sessions/:id/submit-answer",
            post(interview_handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interview/sessions/:id/feedback/:question_id",
            get(interview_handlers::handle_get_feedback),
        )
        .route(
            "/api/v1/interview/sessions/:id/report",
            get(interview_handlers::handle_get_report),
        )
        .route(
            "/api/v1/interview/sessions/:id/cancel",
            post(interview_handlers::handle_cancel_session),
        )
        // Speech API
        .route("/api/v1/speech/asr", post(speech_handlers::handle_transcribe))
        .route("/api/v1/speech/tts", post(speech_handlers::handle_synthesize))
        .route(
            "/api/v1/speech/tts/stream",
            post(speech_handlers::handle_synthesize_stream),
        )
        .with_state(state)
}
