//! Question Bank: holds the immutable question corpus loaded once at startup.

pub mod handlers;
pub mod selector;

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::{Difficulty, Question, QuestionType};

#[derive(Debug, Deserialize)]
struct CorpusFile {
    #[serde(default)]
    questions: Vec<Question>,
}

/// Immutable question corpus. A load failure yields an empty bank rather
/// than a fatal error; the service keeps answering liveness probes and the
/// selector's never-fail contract handles the empty pool.
#[derive(Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Loads the corpus from a JSON file of the shape `{"questions": [...]}`.
    /// Records that fail the corpus invariants are skipped individually.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read question corpus at {}: {e}", path.display());
                return QuestionBank { questions: vec![] };
            }
        };

        let corpus: CorpusFile = match serde_json::from_str(&raw) {
            Ok(corpus) => corpus,
            Err(e) => {
                warn!("Failed to parse question corpus at {}: {e}", path.display());
                return QuestionBank { questions: vec![] };
            }
        };

        let bank = Self::from_questions(corpus.questions);
        info!("Question bank loaded: {} questions", bank.len());
        bank
    }

    /// Builds a bank from an already-held corpus, dropping invalid records.
    pub fn from_questions(questions: Vec<Question>) -> Self {
        let questions = questions
            .into_iter()
            .filter(|q| {
                let valid = q.is_valid();
                if !valid {
                    warn!("Skipping invalid question record '{}'", q.id);
                }
                valid
            })
            .collect();
        QuestionBank { questions }
    }

    /// All questions in corpus order.
    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn by_id(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Questions of one type, preserving corpus order.
    pub fn by_type(&self, question_type: QuestionType) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.question_type == question_type)
            .collect()
    }

    /// Questions of one difficulty, preserving corpus order.
    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::question;
    use std::io::Write;

    fn sample_corpus() -> Vec<Question> {
        vec![
            question("q1", QuestionType::Logic, Difficulty::Easy),
            question("q2", QuestionType::Math, Difficulty::Medium),
            question("q3", QuestionType::Algorithm, Difficulty::Hard),
            question("q4", QuestionType::Logic, Difficulty::Medium),
        ]
    }

    #[test]
    fn test_load_missing_file_yields_empty_bank() {
        let bank = QuestionBank::load("/nonexistent/questions.json");
        assert!(bank.is_empty(), "missing corpus must degrade, not fail");
    }

    #[test]
    fn test_load_malformed_json_yields_empty_bank() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();
        let bank = QuestionBank::load(file.path());
        assert!(bank.is_empty());
    }

    #[test]
    fn test_load_parses_corpus_file() {
        let corpus = serde_json::json!({
            "questions": [{
                "id": "logic_001",
                "type": "logic",
                "difficulty": "easy",
                "title": "Ordering",
                "content": "Who is tallest?",
                "options": [
                    {"key": "A", "content": "Alice"},
                    {"key": "B", "content": "Bob"}
                ],
                "correct_answer": "A",
                "explanation": "Alice is taller than Bob by the given facts.",
                "key_points": ["transitivity"],
                "tags": ["ordering"]
            }]
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{corpus}").unwrap();

        let bank = QuestionBank::load(file.path());
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.by_id("logic_001").unwrap().title, "Ordering");
    }

    #[test]
    fn test_invalid_records_are_skipped_not_fatal() {
        let mut bad = question("bad", QuestionType::Math, Difficulty::Easy);
        bad.correct_answer = "Z".to_string(); // not an option key
        let mut questions = sample_corpus();
        questions.push(bad);

        let bank = QuestionBank::from_questions(questions);
        assert_eq!(bank.len(), 4);
        assert!(bank.by_id("bad").is_none());
    }

    #[test]
    fn test_by_type_preserves_corpus_order() {
        let bank = QuestionBank::from_questions(sample_corpus());
        let logic: Vec<&str> = bank
            .by_type(QuestionType::Logic)
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(logic, vec!["q1", "q4"]);
    }

    #[test]
    fn test_by_difficulty_filters() {
        let bank = QuestionBank::from_questions(sample_corpus());
        let medium = bank.by_difficulty(Difficulty::Medium);
        assert_eq!(medium.len(), 2);
        assert!(medium.iter().all(|q| q.difficulty == Difficulty::Medium));
    }

    #[test]
    fn test_by_id_miss_is_none() {
        let bank = QuestionBank::from_questions(sample_corpus());
        assert!(bank.by_id("q99").is_none());
    }
}
