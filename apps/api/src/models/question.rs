//! Question corpus types: the immutable records the bank serves.

use serde::{Deserialize, Serialize};

/// Question category. Drives type-diverse sampling in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Logic,
    Math,
    Algorithm,
    Scenario,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Logic,
        QuestionType::Math,
        QuestionType::Algorithm,
        QuestionType::Scenario,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Logic => "Logical Reasoning",
            QuestionType::Math => "Mathematical Calculation",
            QuestionType::Algorithm => "Algorithm Thinking",
            QuestionType::Scenario => "Scenario Analysis",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Logic => "logic",
            QuestionType::Math => "math",
            QuestionType::Algorithm => "algorithm",
            QuestionType::Scenario => "scenario",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A single multiple-choice option. Keys are unique within a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub key: String,
    pub content: String,
}

/// An interview question as stored in the corpus. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub options: Option<Vec<QuestionOption>>,
    pub correct_answer: String,
    pub explanation: String,
    /// Evaluation anchors matched against candidate explanations.
    pub key_points: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    /// Checks the corpus invariants: options (when present) have >= 2 entries
    /// with unique keys containing `correct_answer`, and `key_points` is
    /// non-empty. The bank skips records failing this at load time.
    pub fn is_valid(&self) -> bool {
        if self.key_points.is_empty() {
            return false;
        }
        if let Some(options) = &self.options {
            if options.len() < 2 {
                return false;
            }
            let mut keys: Vec<&str> = options.iter().map(|o| o.key.as_str()).collect();
            keys.sort_unstable();
            let unique = keys.windows(2).all(|w| w[0] != w[1]);
            if !unique {
                return false;
            }
            if !options.iter().any(|o| o.key == self.correct_answer) {
                return false;
            }
        }
        true
    }

    /// Client-facing projection. The answer and explanation never leave the
    /// server before submission; `key_points` are shown as hints.
    pub fn display(&self) -> QuestionDisplay {
        QuestionDisplay {
            id: self.id.clone(),
            question_type: self.question_type,
            difficulty: self.difficulty,
            title: self.title.clone(),
            content: self.content.clone(),
            options: self.options.clone(),
            key_points: self.key_points.clone(),
        }
    }
}

/// Question shape exposed to candidates; structurally lacks
/// `correct_answer` and `explanation`, so they cannot serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDisplay {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub options: Option<Vec<QuestionOption>>,
    pub key_points: Vec<String>,
}
