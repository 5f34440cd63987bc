//! Deterministic rule-based scoring, the fallback when no LLM is reachable.
//! Pure function of its inputs; identical inputs always produce identical
//! evaluations.

use crate::models::{AnswerEvaluation, Question};

const BASE_SCORE_CORRECT: i64 = 70;
const BASE_SCORE_INCORRECT: i64 = 30;
const HIT_BONUS_CORRECT: i64 = 10;
const HIT_BONUS_INCORRECT: i64 = 5;
const HINT_EXCERPT_LEN: usize = 100;

/// Scores an answer by case-insensitive substring matching of key points
/// against the candidate's explanation. Not a semantic grader.
pub fn evaluate(
    question: &Question,
    selected_option: Option<&str>,
    explanation: &str,
    is_correct: bool,
) -> AnswerEvaluation {
    let explanation_lower = explanation.to_lowercase();

    let mut key_points_hit = Vec::new();
    let mut key_points_missed = Vec::new();
    for point in &question.key_points {
        if explanation_lower.contains(&point.to_lowercase()) {
            key_points_hit.push(point.clone());
        } else {
            key_points_missed.push(point.clone());
        }
    }

    let (base, bonus) = if is_correct {
        (BASE_SCORE_CORRECT, HIT_BONUS_CORRECT)
    } else {
        (BASE_SCORE_INCORRECT, HIT_BONUS_INCORRECT)
    };
    let score = (base + bonus * key_points_hit.len() as i64).clamp(0, 100);

    let mut hints = Vec::new();
    let feedback = if is_correct {
        let mut text = "Correct answer!".to_string();
        if !key_points_hit.is_empty() {
            text.push_str(&format!(
                " Your approach mentioned {}, well done!",
                key_points_hit.join(", ")
            ));
        }
        if !key_points_missed.is_empty() {
            text.push_str(&format!(
                " You could also consider {}.",
                key_points_missed.join(", ")
            ));
        }
        text
    } else {
        let mut text = format!(
            "Not quite right. The correct answer is {}.",
            question.correct_answer
        );
        if !key_points_hit.is_empty() {
            text.push_str(&format!(
                " However, you mentioned {}, showing the right direction.",
                key_points_hit.join(", ")
            ));
        }
        hints.push(format!("{}...", truncate(&question.explanation, HINT_EXCERPT_LEN)));
        text
    };

    AnswerEvaluation {
        is_correct,
        score,
        feedback,
        hints,
        key_points_hit,
        key_points_missed,
    }
}

/// Truncates at a char boundary so multi-byte explanations cannot panic.
fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
