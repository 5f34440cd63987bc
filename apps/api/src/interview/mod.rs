//! SessionOrchestrator: owns the session table and drives sessions through
//! selection, evaluation, and reporting.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::bank::selector;
use crate::bank::QuestionBank;
use crate::errors::AppError;
use crate::evaluation::Evaluator;
use crate::models::{
    AnswerEvaluation, AnswerRecord, InterviewReport, InterviewSession, QuestionDisplay,
    SessionStatus,
};
use crate::reporting::ReportAggregator;

const MIN_QUESTION_COUNT: usize = 2;
const MAX_QUESTION_COUNT: usize = 5;

/// Parameters for creating one session.
#[derive(Debug, Default)]
pub struct NewSession {
    pub candidate_name: Option<String>,
    pub position: Option<String>,
    /// Opaque parsed resume payload from the upstream parser.
    pub resume_data: Option<Value>,
    /// Opaque parsed JD payload from the upstream parser.
    pub jd_data: Option<Value>,
    pub question_count: Option<usize>,
}

/// Current question plus its position, for client rendering.
#[derive(Debug, Clone)]
pub struct QuestionCursor {
    pub current_index: usize,
    pub total_questions: usize,
    pub question: QuestionDisplay,
}

/// Result of one answer submission.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub evaluation: AnswerEvaluation,
    pub has_next: bool,
    pub next_question: Option<QuestionDisplay>,
}

/// The session table maps ids to individually locked sessions: the outer
/// `RwLock` guards insert/lookup, the per-session `Mutex` serializes
/// mutation. Different sessions progress independently.
type SessionTable = RwLock<HashMap<Uuid, Arc<Mutex<InterviewSession>>>>;

pub struct SessionOrchestrator {
    bank: Arc<QuestionBank>,
    evaluator: Evaluator,
    aggregator: ReportAggregator,
    sessions: SessionTable,
}

impl SessionOrchestrator {
    pub fn new(bank: Arc<QuestionBank>, evaluator: Evaluator, aggregator: ReportAggregator) -> Self {
        SessionOrchestrator {
            bank,
            evaluator,
            aggregator,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a session with its question list fixed up front. An explicit
    /// count is clamped to 2..=5 and drives constrained selection; without
    /// one, the auto-select policy decides the interview length.
    pub async fn create_session(&self, request: NewSession) -> InterviewSession {
        let questions = {
            let mut rng = rand::thread_rng();
            let corpus = self.bank.all();
            match request.question_count {
                Some(count) => {
                    let count = count.clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT);
                    if request.resume_data.is_some() || request.jd_data.is_some() {
                        selector::select_for_profile(
                            corpus,
                            count,
                            request.resume_data.as_ref(),
                            request.jd_data.as_ref(),
                            &mut rng,
                        )
                    } else {
                        selector::select(corpus, count, &Default::default(), &mut rng)
                    }
                }
                None => selector::auto_select(corpus, &mut rng),
            }
        };

        let session =
            InterviewSession::new(request.candidate_name, request.position, questions);
        let snapshot = session.clone();
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::new(Mutex::new(session)));

        info!(
            "Session {} created with {} questions",
            snapshot.id, snapshot.question_count
        );
        snapshot
    }

    /// Transitions Pending to InProgress; any other state is left unchanged.
    /// Returns the session snapshot and the current question, if any.
    pub async fn start_interview(
        &self,
        id: Uuid,
    ) -> Result<(InterviewSession, Option<QuestionCursor>), AppError> {
        let handle = self.session_handle(id).await?;
        let mut session = handle.lock().await;
        if session.status == SessionStatus::Pending {
            session.status = SessionStatus::InProgress;
            info!("Session {id} started");
        }
        let cursor = current_cursor(&session);
        Ok((session.clone(), cursor))
    }

    pub async fn get_session(&self, id: Uuid) -> Result<InterviewSession, AppError> {
        let handle = self.session_handle(id).await?;
        let session = handle.lock().await;
        Ok(session.clone())
    }

    /// The question the candidate should answer next; `None` when the
    /// session is not in progress or the list is exhausted.
    pub async fn get_current_question(
        &self,
        id: Uuid,
    ) -> Result<Option<QuestionCursor>, AppError> {
        let handle = self.session_handle(id).await?;
        let session = handle.lock().await;
        Ok(current_cursor(&session))
    }

    /// Records one answer. Preconditions are checked under the session lock,
    /// the evaluation runs outside it, and the same preconditions are
    /// re-checked before the append so a concurrent duplicate submission
    /// cannot double-record.
    pub async fn submit_answer(
        &self,
        id: Uuid,
        question_id: &str,
        selected_option: Option<String>,
        explanation: String,
    ) -> Result<SubmitOutcome, AppError> {
        let handle = self.session_handle(id).await?;

        let question = {
            let session = handle.lock().await;
            validate_submission(&session, question_id)?.clone()
        };

        let evaluation = self
            .evaluator
            .evaluate(&question, selected_option.as_deref(), &explanation)
            .await;

        let mut session = handle.lock().await;
        validate_submission(&session, question_id)?;

        session.answers.push(AnswerRecord {
            question_id: question_id.to_string(),
            selected_option,
            explanation,
            evaluation: evaluation.clone(),
            submitted_at: Utc::now(),
        });
        session.current_question_index += 1;

        let has_next = session.current_question_index < session.question_count;
        let next_question = if has_next {
            session.current_question().map(|q| q.display())
        } else {
            session.status = SessionStatus::Completed;
            session.completed_at = Some(Utc::now());
            info!("Session {id} completed");
            None
        };

        Ok(SubmitOutcome {
            evaluation,
            has_next,
            next_question,
        })
    }

    /// Conversational feedback for an already recorded answer, for the voice
    /// flow. Empty string when no record matches the question id.
    pub async fn get_feedback_text(
        &self,
        id: Uuid,
        question_id: &str,
    ) -> Result<String, AppError> {
        let handle = self.session_handle(id).await?;
        let evaluation = {
            let session = handle.lock().await;
            session
                .answers
                .iter()
                .find(|a| a.question_id == question_id)
                .map(|a| a.evaluation.clone())
        };

        match evaluation {
            Some(evaluation) => Ok(self.aggregator.feedback_text(&evaluation).await),
            None => Ok(String::new()),
        }
    }

    /// `None` until the session completes; a pending report is an expected
    /// state, not an error.
    pub async fn generate_report(&self, id: Uuid) -> Result<Option<InterviewReport>, AppError> {
        let handle = self.session_handle(id).await?;
        let snapshot = {
            let session = handle.lock().await;
            session.clone()
        };
        Ok(self.aggregator.generate(&snapshot).await)
    }

    /// Returns whether the session was actually cancelled; Completed and
    /// Cancelled sessions are left untouched.
    pub async fn cancel_session(&self, id: Uuid) -> Result<bool, AppError> {
        let handle = self.session_handle(id).await?;
        let mut session = handle.lock().await;
        match session.status {
            SessionStatus::Pending | SessionStatus::InProgress => {
                session.status = SessionStatus::Cancelled;
                info!("Session {id} cancelled");
                Ok(true)
            }
            SessionStatus::Completed | SessionStatus::Cancelled => Ok(false),
        }
    }

    /// Opening line shown (and spoken) to the candidate before the first
    /// question.
    pub fn welcome_message(&self, session: &InterviewSession) -> String {
        let name = session.candidate_name.as_deref().unwrap_or("candidate");
        let position = session.position.as_deref().unwrap_or("this position");
        format!(
            "Hello, {name}! Welcome to the quick interview round for {position}.\n\n\
            I am your AI interviewer. I will show you {count} reasoning questions. \
            Please read each one carefully, pick the answer you believe is correct, \
            and briefly explain your approach. If you are stuck, write down your \
            thoughts anyway.\n\nReady? Let's begin!",
            count = session.question_count
        )
    }

    async fn session_handle(&self, id: Uuid) -> Result<Arc<Mutex<InterviewSession>>, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }
}

fn current_cursor(session: &InterviewSession) -> Option<QuestionCursor> {
    if session.status != SessionStatus::InProgress {
        return None;
    }
    session.current_question().map(|q| QuestionCursor {
        current_index: session.current_question_index,
        total_questions: session.question_count,
        question: q.display(),
    })
}

/// Shared precondition check for both sides of the evaluate-outside-lock
/// window.
fn validate_submission<'a>(
    session: &'a InterviewSession,
    question_id: &str,
) -> Result<&'a crate::models::Question, AppError> {
    if session.status != SessionStatus::InProgress {
        return Err(AppError::InvalidState(
            "session is not in progress".to_string(),
        ));
    }
    match session.current_question() {
        Some(question) if question.id == question_id => Ok(question),
        Some(_) => Err(AppError::InvalidState(
            "question does not match the current question".to_string(),
        )),
        None => Err(AppError::InvalidState(
            "no question left to answer".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::question;
    use crate::models::{Difficulty, QuestionType};

    fn orchestrator_with(questions: Vec<crate::models::Question>) -> SessionOrchestrator {
        let bank = Arc::new(QuestionBank::from_questions(questions));
        SessionOrchestrator::new(bank, Evaluator::new(None), ReportAggregator::new(None))
    }

    fn orchestrator() -> SessionOrchestrator {
        orchestrator_with(vec![
            question("q1", QuestionType::Logic, Difficulty::Easy),
            question("q2", QuestionType::Math, Difficulty::Medium),
            question("q3", QuestionType::Algorithm, Difficulty::Hard),
            question("q4", QuestionType::Scenario, Difficulty::Medium),
        ])
    }

    fn request(count: Option<usize>) -> NewSession {
        NewSession {
            candidate_name: Some("Ada".to_string()),
            position: Some("Backend Engineer".to_string()),
            question_count: count,
            ..Default::default()
        }
    }

    /// Drives a started session to completion, answering correctly each time.
    async fn answer_all(orchestrator: &SessionOrchestrator, id: Uuid) {
        loop {
            let Some(cursor) = orchestrator.get_current_question(id).await.unwrap() else {
                break;
            };
            orchestrator
                .submit_answer(
                    id,
                    &cursor.question.id,
                    Some("A".to_string()),
                    "pigeonhole".to_string(),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_create_session_with_count_is_pending() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;
        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.question_count, 2);
        assert_eq!(session.current_question_index, 0);
    }

    #[tokio::test]
    async fn test_create_session_clamps_count() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(100))).await;
        assert_eq!(session.question_count, 4, "clamped to 5, capped by corpus");

        let session = orchestrator.create_session(request(Some(0))).await;
        assert_eq!(session.question_count, 2);
    }

    #[tokio::test]
    async fn test_create_session_auto_selects_two_or_three() {
        let orchestrator = orchestrator();
        for _ in 0..10 {
            let session = orchestrator.create_session(request(None)).await;
            assert!(
                session.question_count == 2 || session.question_count == 3,
                "auto-select must pick 2 or 3, got {}",
                session.question_count
            );
        }
    }

    #[tokio::test]
    async fn test_create_session_empty_corpus_yields_empty_session() {
        let orchestrator = orchestrator_with(vec![]);
        let session = orchestrator.create_session(request(Some(3))).await;
        assert_eq!(session.question_count, 0);
        assert_eq!(session.status, SessionStatus::Pending);
    }

    #[tokio::test]
    async fn test_start_transitions_pending_and_is_idempotent() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;

        let (started, cursor) = orchestrator.start_interview(session.id).await.unwrap();
        assert_eq!(started.status, SessionStatus::InProgress);
        let cursor = cursor.unwrap();
        assert_eq!(cursor.current_index, 0);
        assert_eq!(cursor.total_questions, 2);

        let (again, _) = orchestrator.start_interview(session.id).await.unwrap();
        assert_eq!(again.status, SessionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_start_unknown_session_is_not_found() {
        let orchestrator = orchestrator();
        let err = orchestrator.start_interview(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_current_question_none_before_start() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;
        assert!(orchestrator
            .get_current_question(session.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_submit_answer_advances_and_completes() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;
        let (_, cursor) = orchestrator.start_interview(session.id).await.unwrap();

        let first = cursor.unwrap().question;
        let outcome = orchestrator
            .submit_answer(
                session.id,
                &first.id,
                Some("A".to_string()),
                "pigeonhole".to_string(),
            )
            .await
            .unwrap();
        assert!(outcome.evaluation.is_correct);
        assert!(outcome.has_next);
        let second = outcome.next_question.unwrap();
        assert_ne!(second.id, first.id);

        let outcome = orchestrator
            .submit_answer(session.id, &second.id, Some("B".to_string()), String::new())
            .await
            .unwrap();
        assert!(!outcome.evaluation.is_correct);
        assert!(!outcome.has_next);
        assert!(outcome.next_question.is_none());

        let finished = orchestrator.get_session(session.id).await.unwrap();
        assert_eq!(finished.status, SessionStatus::Completed);
        assert!(finished.completed_at.is_some());
        assert_eq!(finished.current_question_index, finished.question_count);
        assert_eq!(finished.answers.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_before_start_is_invalid_state() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;
        let err = orchestrator
            .submit_answer(session.id, "q1", None, String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_submit_wrong_question_id_is_invalid_state() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;
        orchestrator.start_interview(session.id).await.unwrap();

        let err = orchestrator
            .submit_answer(session.id, "not-the-current-one", None, String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_submit_after_completion_is_invalid_state() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;
        orchestrator.start_interview(session.id).await.unwrap();
        answer_all(&orchestrator, session.id).await;

        let err = orchestrator
            .submit_answer(session.id, "q1", Some("A".to_string()), String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_report_unavailable_until_completed() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;
        assert!(orchestrator
            .generate_report(session.id)
            .await
            .unwrap()
            .is_none());

        orchestrator.start_interview(session.id).await.unwrap();
        answer_all(&orchestrator, session.id).await;

        let report = orchestrator
            .generate_report(session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.session_id, session.id);
        assert_eq!(report.total_questions, 2);
        assert_eq!(report.correct_count, 2, "fixture answer A is always correct");
    }

    #[tokio::test]
    async fn test_feedback_text_for_recorded_answer() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(2))).await;
        let (_, cursor) = orchestrator.start_interview(session.id).await.unwrap();
        let first = cursor.unwrap().question;

        orchestrator
            .submit_answer(
                session.id,
                &first.id,
                Some("A".to_string()),
                "pigeonhole".to_string(),
            )
            .await
            .unwrap();

        let feedback = orchestrator
            .get_feedback_text(session.id, &first.id)
            .await
            .unwrap();
        assert!(feedback.contains("Correct answer"));

        let missing = orchestrator
            .get_feedback_text(session.id, "never-answered")
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_only_from_pending_or_in_progress() {
        let orchestrator = orchestrator();

        let session = orchestrator.create_session(request(Some(2))).await;
        assert!(orchestrator.cancel_session(session.id).await.unwrap());
        assert!(
            !orchestrator.cancel_session(session.id).await.unwrap(),
            "second cancel is a no-op"
        );

        let session = orchestrator.create_session(request(Some(2))).await;
        orchestrator.start_interview(session.id).await.unwrap();
        answer_all(&orchestrator, session.id).await;
        assert!(
            !orchestrator.cancel_session(session.id).await.unwrap(),
            "completed sessions cannot be cancelled"
        );
    }

    #[tokio::test]
    async fn test_welcome_message_names_candidate_and_count() {
        let orchestrator = orchestrator();
        let session = orchestrator.create_session(request(Some(3))).await;
        let message = orchestrator.welcome_message(&session);
        assert!(message.contains("Ada"));
        assert!(message.contains("Backend Engineer"));
        assert!(message.contains("3 reasoning questions"));
    }
}
