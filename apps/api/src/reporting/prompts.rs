// All LLM prompt constants for the Reporting module.

use crate::models::{AnswerEvaluation, AnswerRecord, Question};

/// System prompt for report analysis; enforces JSON-only output.
pub const REPORT_ANALYSIS_SYSTEM: &str =
    "You are a professional recruitment consultant. Objectively analyze \
    candidate performance. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// System prompt for conversational feedback used in voice interviews.
pub const FEEDBACK_SYSTEM: &str = "You are a friendly and professional technical interviewer.";

/// Builds the user prompt for the narrative report analysis.
pub fn build_report_analysis_prompt(
    questions: &[Question],
    answers: &[AnswerRecord],
    avg_score: i64,
    correct_count: usize,
    total_questions: usize,
) -> String {
    let answers_summary = questions
        .iter()
        .zip(answers)
        .enumerate()
        .map(|(i, (q, a))| {
            let status = if a.evaluation.is_correct {
                "Correct"
            } else {
                "Incorrect"
            };
            format!(
                "Question {} ({}): Score {}, {}",
                i + 1,
                q.question_type.as_str(),
                a.evaluation.score,
                status
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Please analyze the following interview results and generate report content:

Interview Summary:
- Total Questions: {total_questions}
- Correct Answers: {correct_count}
- Average Score: {avg_score}

Question Details:
{answers_summary}

Output a JSON object with this EXACT schema:
{{
    "strengths": ["2-3 candidate strengths"],
    "weaknesses": ["1-2 areas for improvement"],
    "overall_comment": "Overall evaluation within 100 characters",
    "recommendation": "Recommendation for the hiring team, such as whether to proceed to the next round"
}}"#
    )
}

/// Builds the user prompt for a short spoken feedback line after one answer.
pub fn build_feedback_prompt(evaluation: &AnswerEvaluation) -> String {
    format!(
        r#"As an interviewer, generate a conversational feedback line based on the following evaluation result.
Requirements:
1. Friendly and professional tone
2. Acknowledge if correct
3. Gently point out and guide if incorrect
4. Keep within 100 characters

Evaluation Result:
- Answer Correct: {is_correct}
- Score: {score}
- Key Points Hit: {hit:?}
- Key Points Missed: {missed:?}

Output the feedback text directly, no other formatting."#,
        is_correct = evaluation.is_correct,
        score = evaluation.score,
        hit = evaluation.key_points_hit,
        missed = evaluation.key_points_missed,
    )
}
