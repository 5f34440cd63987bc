// All LLM prompt constants for the Evaluation module.

use crate::models::Question;

/// System prompt for answer evaluation; enforces JSON-only output.
pub const EVALUATION_SYSTEM: &str =
    "You are a professional technical interviewer responsible for evaluating \
    candidates' answers and problem-solving approaches. Provide objective, \
    professional feedback. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Builds the user prompt for evaluating one answer.
pub fn build_evaluation_prompt(
    question: &Question,
    selected_option: Option<&str>,
    explanation: &str,
) -> String {
    let options_text = match &question.options {
        Some(options) => options
            .iter()
            .map(|o| format!("{}. {}", o.key, o.content))
            .collect::<Vec<_>>()
            .join("\n"),
        None => String::new(),
    };

    format!(
        r#"Please evaluate the following interview answer:

## Question
{title}

{content}

Options:
{options_text}

Correct Answer: {correct_answer}
Answer Explanation: {explanation_text}
Key Points: {key_points}

## Candidate's Answer
Selected Option: {selected}
Problem-solving Approach: {candidate_explanation}

## Output a JSON object with this EXACT schema:
{{
    "score": <integer 0-100>,
    "feedback": "Feedback for the candidate, friendly and professional tone, point out errors if any, acknowledge good approaches",
    "hints": ["Hints if the candidate is stuck or has a wrong approach"],
    "key_points_hit": ["Key points the candidate mentioned or got right"],
    "key_points_missed": ["Key points the candidate missed"]
}}"#,
        title = question.title,
        content = question.content,
        options_text = options_text,
        correct_answer = question.correct_answer,
        explanation_text = question.explanation,
        key_points = question.key_points.join(", "),
        selected = selected_option.unwrap_or("Not selected"),
        candidate_explanation = explanation,
    )
}
