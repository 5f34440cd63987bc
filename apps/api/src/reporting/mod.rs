//! ReportAggregator: folds a completed session into a scored report.
//! Narrative analysis is LLM-primary with threshold rules as fallback.

pub mod prompts;

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::llm_client::{ChatMessage, LlmClient};
use crate::models::{
    AnswerEvaluation, AnswerRecord, InterviewReport, InterviewSession, Question, QuestionReport,
    SessionStatus,
};

const ANSWER_EXCERPT_LEN: usize = 50;
const SUMMARY_EXCERPT_LEN: usize = 100;

/// Narrative sections the model is contracted to return.
#[derive(Debug, Deserialize)]
struct LlmAnalysis {
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    overall_comment: String,
    #[serde(default)]
    recommendation: String,
}

struct Analysis {
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    overall_comment: String,
    recommendation: String,
}

pub struct ReportAggregator {
    llm: Option<LlmClient>,
}

impl ReportAggregator {
    pub fn new(llm: Option<LlmClient>) -> Self {
        ReportAggregator { llm }
    }

    /// Builds the final report. Returns `None` unless the session is
    /// `Completed`; a pending report is an expected state, not an error.
    pub async fn generate(&self, session: &InterviewSession) -> Option<InterviewReport> {
        if session.status != SessionStatus::Completed {
            return None;
        }

        let answers = &session.answers;
        let total_questions = answers.len();
        let score_sum: i64 = answers.iter().map(|a| a.evaluation.score).sum();
        let correct_count = answers.iter().filter(|a| a.evaluation.is_correct).count();
        let avg_score = if total_questions > 0 {
            score_sum / total_questions as i64
        } else {
            0
        };

        // Questions and answers share length and order by construction;
        // the orchestrator appends exactly one answer per question.
        let question_reports = session
            .questions
            .iter()
            .zip(answers)
            .map(|(q, a)| QuestionReport {
                question_title: q.title.clone(),
                question_type: q.question_type,
                difficulty: q.difficulty,
                is_correct: a.evaluation.is_correct,
                score: a.evaluation.score,
                candidate_answer: format!(
                    "{}: {}...",
                    a.selected_option.as_deref().unwrap_or("Not selected"),
                    truncate(&a.explanation, ANSWER_EXCERPT_LEN)
                ),
                correct_answer: q.correct_answer.clone(),
                evaluation_summary: truncate(&a.evaluation.feedback, SUMMARY_EXCERPT_LEN)
                    .to_string(),
            })
            .collect();

        let analysis = self
            .analyze(
                &session.questions,
                answers,
                avg_score,
                correct_count,
                total_questions,
            )
            .await;

        Some(InterviewReport {
            session_id: session.id,
            candidate_name: session.candidate_name.clone(),
            position: session.position.clone(),
            total_score: avg_score,
            total_questions,
            correct_count,
            logic_ability: avg_score,
            expression_ability: (avg_score + 10).min(100),
            problem_solving: avg_score,
            question_reports,
            strengths: analysis.strengths,
            weaknesses: analysis.weaknesses,
            overall_comment: analysis.overall_comment,
            recommendation: analysis.recommendation,
            interview_duration: session.duration_secs(),
            created_at: Utc::now(),
        })
    }

    /// A short spoken feedback line for one answer, used by the voice flow.
    /// Falls back to the stored evaluation feedback without a model.
    pub async fn feedback_text(&self, evaluation: &AnswerEvaluation) -> String {
        let Some(llm) = &self.llm else {
            return evaluation.feedback.clone();
        };

        let messages = [
            ChatMessage::system(prompts::FEEDBACK_SYSTEM),
            ChatMessage::user(prompts::build_feedback_prompt(evaluation)),
        ];

        match llm.call(&messages, false).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("LLM feedback generation failed, using stored feedback: {e}");
                evaluation.feedback.clone()
            }
        }
    }

    async fn analyze(
        &self,
        questions: &[Question],
        answers: &[AnswerRecord],
        avg_score: i64,
        correct_count: usize,
        total_questions: usize,
    ) -> Analysis {
        let Some(llm) = &self.llm else {
            return rule_based_analysis(avg_score, correct_count, total_questions);
        };

        let messages = [
            ChatMessage::system(prompts::REPORT_ANALYSIS_SYSTEM),
            ChatMessage::user(prompts::build_report_analysis_prompt(
                questions,
                answers,
                avg_score,
                correct_count,
                total_questions,
            )),
        ];

        match llm.call_json::<LlmAnalysis>(&messages).await {
            Ok(result) => Analysis {
                strengths: result.strengths,
                weaknesses: result.weaknesses,
                overall_comment: result.overall_comment,
                recommendation: result.recommendation,
            },
            Err(e) => {
                warn!("LLM report analysis failed, using rule-based analysis: {e}");
                rule_based_analysis(avg_score, correct_count, total_questions)
            }
        }
    }
}

/// Threshold-based narrative used whenever the model path is unavailable.
fn rule_based_analysis(avg_score: i64, correct_count: usize, total_questions: usize) -> Analysis {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if avg_score >= 80 {
        strengths.push("Strong logical thinking ability".to_string());
        strengths.push("Clear problem-solving approach".to_string());
    } else if avg_score >= 60 {
        strengths.push("Basic logical thinking ability".to_string());
    }
    if total_questions > 0 && correct_count == total_questions {
        strengths.push("High answer accuracy".to_string());
    }

    if avg_score < 60 {
        weaknesses.push("Logical thinking needs improvement".to_string());
    }
    if correct_count < total_questions / 2 {
        weaknesses.push("Some questions not fully understood".to_string());
    }

    if strengths.is_empty() {
        strengths.push("Serious attitude, actively answered".to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push("Can further improve problem-solving efficiency".to_string());
    }

    let (overall_comment, recommendation) = if avg_score >= 80 {
        (
            "Candidate performed excellently with strong logical thinking and a clear approach.",
            "Recommend proceeding to the next interview round.",
        )
    } else if avg_score >= 60 {
        (
            "Candidate performed well with basic logical thinking ability.",
            "Consider the next round, but focus on analytical ability.",
        )
    } else {
        (
            "Candidate's logical thinking needs improvement.",
            "Recommend postponing the next round or arranging a supplementary test.",
        )
    };

    Analysis {
        strengths,
        weaknesses,
        overall_comment: overall_comment.to_string(),
        recommendation: recommendation.to_string(),
    }
}

/// Truncates at a char boundary.
fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
