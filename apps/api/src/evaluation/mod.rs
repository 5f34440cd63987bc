//! Evaluator: scores one answer. LLM-primary with a deterministic rule
//! fallback; the caller never sees an evaluation failure.

pub mod prompts;
pub mod rules;

use serde::Deserialize;
use tracing::warn;

use crate::llm_client::{ChatMessage, LlmClient};
use crate::models::{AnswerEvaluation, Question};

/// Shape the model is contracted to return. `is_correct` is intentionally
/// absent: correctness is computed locally and never trusted from the model.
#[derive(Debug, Deserialize)]
struct LlmEvaluation {
    score: Option<i64>,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    hints: Vec<String>,
    #[serde(default)]
    key_points_hit: Vec<String>,
    #[serde(default)]
    key_points_missed: Vec<String>,
}

const DEFAULT_SCORE_CORRECT: i64 = 60;
const DEFAULT_SCORE_INCORRECT: i64 = 30;

/// Scores answers. Holds the LLM client when a credential was configured;
/// without one, every evaluation takes the rule path.
pub struct Evaluator {
    llm: Option<LlmClient>,
}

impl Evaluator {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Evaluator { llm }
    }

    /// Evaluates one answer. Correctness is `selected_option ==
    /// question.correct_answer` (false when nothing was selected), computed
    /// before any model call and never overridden by it.
    pub async fn evaluate(
        &self,
        question: &Question,
        selected_option: Option<&str>,
        explanation: &str,
    ) -> AnswerEvaluation {
        let is_correct = selected_option == Some(question.correct_answer.as_str());

        let Some(llm) = &self.llm else {
            return rules::evaluate(question, selected_option, explanation, is_correct);
        };

        let messages = [
            ChatMessage::system(prompts::EVALUATION_SYSTEM),
            ChatMessage::user(prompts::build_evaluation_prompt(
                question,
                selected_option,
                explanation,
            )),
        ];

        match llm.call_json::<LlmEvaluation>(&messages).await {
            Ok(result) => {
                let default_score = if is_correct {
                    DEFAULT_SCORE_CORRECT
                } else {
                    DEFAULT_SCORE_INCORRECT
                };
                AnswerEvaluation {
                    is_correct,
                    score: result.score.unwrap_or(default_score).clamp(0, 100),
                    feedback: result.feedback,
                    hints: result.hints,
                    key_points_hit: result.key_points_hit,
                    key_points_missed: result.key_points_missed,
                }
            }
            Err(e) => {
                warn!("LLM evaluation failed, using rule-based fallback: {e}");
                rules::evaluate(question, selected_option, explanation, is_correct)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::question;
    use crate::models::{Difficulty, QuestionType};

    fn evaluator() -> Evaluator {
        Evaluator::new(None)
    }

    #[tokio::test]
    async fn test_matching_option_is_correct_regardless_of_explanation() {
        let q = question("q1", QuestionType::Logic, Difficulty::Easy);
        let eval = evaluator().evaluate(&q, Some("A"), "gibberish").await;
        assert!(eval.is_correct);
    }

    #[tokio::test]
    async fn test_wrong_option_is_incorrect() {
        let q = question("q1", QuestionType::Logic, Difficulty::Easy);
        let eval = evaluator().evaluate(&q, Some("B"), "pigeonhole counting").await;
        assert!(!eval.is_correct);
    }

    #[tokio::test]
    async fn test_no_selection_is_incorrect() {
        let q = question("q1", QuestionType::Logic, Difficulty::Easy);
        let eval = evaluator().evaluate(&q, None, "pigeonhole").await;
        assert!(!eval.is_correct);
    }

    #[tokio::test]
    async fn test_without_credential_takes_rule_path() {
        let q = question("q1", QuestionType::Logic, Difficulty::Easy);
        let eval = evaluator().evaluate(&q, Some("A"), "pigeonhole").await;
        assert_eq!(eval.score, 80, "rule path: 70 base + 10 for one hit");
        assert_eq!(eval.key_points_hit.len(), 1);
    }

    #[test]
    fn test_llm_shape_tolerates_missing_fields() {
        let parsed: LlmEvaluation = serde_json::from_str(r#"{"feedback": "ok"}"#).unwrap();
        assert!(parsed.score.is_none());
        assert!(parsed.hints.is_empty());
    }
}
