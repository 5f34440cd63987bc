//! Question Selector: diversity-first, difficulty-gated sampling over the
//! corpus. Free functions parameterized on an `Rng` so tests can seed draws.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::models::{Difficulty, Question, QuestionType};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Constraints applied with AND semantics. All fields optional; an empty
/// filter matches the whole corpus.
#[derive(Debug, Clone, Default)]
pub struct SelectionFilter {
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<QuestionType>,
    pub tags: Option<Vec<String>>,
}

impl SelectionFilter {
    fn matches(&self, question: &Question) -> bool {
        if let Some(difficulty) = self.difficulty {
            if question.difficulty != difficulty {
                return false;
            }
        }
        if let Some(question_type) = self.question_type {
            if question.question_type != question_type {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.is_empty() && !tags.iter().any(|t| question.tags.contains(t)) {
                return false;
            }
        }
        true
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Selection algorithms
// ────────────────────────────────────────────────────────────────────────────

/// Auto-select draws this many type-diverse candidates before applying the
/// difficulty gate.
const AUTO_SELECT_COUNT: usize = 3;

/// Constrained selection with graceful widening.
///
/// Algorithm:
/// 1. Filter the corpus by each present constraint (AND)
/// 2. If the filtered pool has fewer than `count` candidates, discard all
///    filters and use the full corpus
/// 3. Type-diverse sampling: shuffle, take at most one question per distinct
///    type, then fill remaining slots from the untaken remainder
///
/// Never fails: an empty corpus yields an empty list, and a pool smaller than
/// `count` yields the whole shuffled pool.
pub fn select(
    corpus: &[Question],
    count: usize,
    filter: &SelectionFilter,
    rng: &mut impl Rng,
) -> Vec<Question> {
    let mut pool: Vec<&Question> = corpus.iter().filter(|q| filter.matches(q)).collect();
    if pool.len() < count {
        pool = corpus.iter().collect();
    }
    type_diverse_sample(&pool, count, rng)
}

/// Fixed-policy selection for sessions created without explicit constraints.
///
/// Draws 3 type-diverse questions; if none of them is `easy`, only the first
/// 2 (post-shuffle order) are kept so a hard opening shortens the interview
/// instead of stretching it.
pub fn auto_select(corpus: &[Question], rng: &mut impl Rng) -> Vec<Question> {
    let pool: Vec<&Question> = corpus.iter().collect();
    let mut picked = type_diverse_sample(&pool, AUTO_SELECT_COUNT, rng);
    let has_easy = picked.iter().any(|q| q.difficulty == Difficulty::Easy);
    if !has_easy {
        picked.truncate(2);
    }
    picked
}

/// Resume/JD-informed selection. Derives a difficulty preference from the
/// candidate's years of experience and tag hints from listed skills, then
/// delegates to `select`.
pub fn select_for_profile(
    corpus: &[Question],
    count: usize,
    resume: Option<&Value>,
    jd: Option<&Value>,
    rng: &mut impl Rng,
) -> Vec<Question> {
    let filter = SelectionFilter {
        difficulty: experience_years(resume).map(|years| {
            if years >= 5 {
                Difficulty::Hard
            } else if years >= 2 {
                Difficulty::Medium
            } else {
                Difficulty::Easy
            }
        }),
        question_type: None,
        tags: skill_tags(resume, jd),
    };
    select(corpus, count, &filter, rng)
}

/// Shuffles the pool, greedily covers distinct types, then fills remaining
/// slots from the untaken remainder. Returns at most `count` questions with
/// no duplicate ids.
fn type_diverse_sample(pool: &[&Question], count: usize, rng: &mut impl Rng) -> Vec<Question> {
    let mut shuffled: Vec<&Question> = pool.to_vec();
    shuffled.shuffle(rng);

    if count >= shuffled.len() {
        return shuffled.into_iter().cloned().collect();
    }

    let mut picked: Vec<&Question> = Vec::with_capacity(count);
    let mut taken_types: HashSet<QuestionType> = HashSet::new();
    let mut taken_ids: HashSet<&str> = HashSet::new();

    for question in &shuffled {
        if picked.len() == count {
            break;
        }
        if taken_types.insert(question.question_type) {
            taken_ids.insert(question.id.as_str());
            picked.push(question);
        }
    }

    for question in &shuffled {
        if picked.len() == count {
            break;
        }
        if taken_ids.insert(question.id.as_str()) {
            picked.push(question);
        }
    }

    picked.into_iter().cloned().collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Profile extraction
// ────────────────────────────────────────────────────────────────────────────

fn experience_years(resume: Option<&Value>) -> Option<i64> {
    resume?.get("experience_years")?.as_i64()
}

fn skill_tags(resume: Option<&Value>, jd: Option<&Value>) -> Option<Vec<String>> {
    let mut tags: Vec<String> = Vec::new();
    for payload in [resume, jd].into_iter().flatten() {
        if let Some(skills) = payload.get("skills").and_then(Value::as_array) {
            for skill in skills {
                if let Some(s) = skill.as_str() {
                    let s = s.to_lowercase();
                    if !tags.contains(&s) {
                        tags.push(s);
                    }
                }
            }
        }
    }
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::question;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn corpus() -> Vec<Question> {
        vec![
            question("q1", QuestionType::Logic, Difficulty::Easy),
            question("q2", QuestionType::Math, Difficulty::Medium),
            question("q3", QuestionType::Algorithm, Difficulty::Hard),
            question("q4", QuestionType::Scenario, Difficulty::Medium),
            question("q5", QuestionType::Logic, Difficulty::Hard),
            question("q6", QuestionType::Math, Difficulty::Easy),
        ]
    }

    fn ids(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(|q| q.id.as_str()).collect()
    }

    #[test]
    fn test_select_returns_exactly_count_when_unfiltered() {
        let corpus = corpus();
        for seed in 0..20 {
            let picked = select(&corpus, 3, &SelectionFilter::default(), &mut rng(seed));
            assert_eq!(picked.len(), 3);
        }
    }

    #[test]
    fn test_select_never_returns_duplicate_ids() {
        let corpus = corpus();
        for seed in 0..50 {
            let picked = select(&corpus, 5, &SelectionFilter::default(), &mut rng(seed));
            let mut seen = ids(&picked);
            seen.sort_unstable();
            let before = seen.len();
            seen.dedup();
            assert_eq!(seen.len(), before, "duplicate id in draw with seed {seed}");
        }
    }

    #[test]
    fn test_select_caps_at_pool_size() {
        let corpus = corpus();
        let picked = select(&corpus, 99, &SelectionFilter::default(), &mut rng(0));
        assert_eq!(picked.len(), corpus.len());
    }

    #[test]
    fn test_select_empty_corpus_yields_empty_list() {
        let picked = select(&[], 3, &SelectionFilter::default(), &mut rng(0));
        assert!(picked.is_empty());
    }

    #[test]
    fn test_select_prefers_distinct_types() {
        let corpus = corpus();
        for seed in 0..20 {
            let picked = select(&corpus, 4, &SelectionFilter::default(), &mut rng(seed));
            let types: HashSet<QuestionType> =
                picked.iter().map(|q| q.question_type).collect();
            assert_eq!(types.len(), 4, "4 slots over 4 types must cover all types");
        }
    }

    #[test]
    fn test_select_honors_difficulty_filter() {
        let corpus = corpus();
        let filter = SelectionFilter {
            difficulty: Some(Difficulty::Medium),
            ..Default::default()
        };
        let picked = select(&corpus, 2, &filter, &mut rng(7));
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|q| q.difficulty == Difficulty::Medium));
    }

    #[test]
    fn test_select_widens_when_filter_starves_pool() {
        let corpus = corpus();
        // Only one hard logic question exists; asking for 3 must widen.
        let filter = SelectionFilter {
            difficulty: Some(Difficulty::Hard),
            question_type: Some(QuestionType::Logic),
            ..Default::default()
        };
        let picked = select(&corpus, 3, &filter, &mut rng(3));
        assert_eq!(picked.len(), 3, "starved filter must widen to full corpus");
    }

    #[test]
    fn test_select_matches_any_requested_tag() {
        let mut corpus = corpus();
        corpus[1].tags = vec!["graphs".to_string()];
        corpus[4].tags = vec!["graphs".to_string(), "recursion".to_string()];
        let filter = SelectionFilter {
            tags: Some(vec!["graphs".to_string()]),
            ..Default::default()
        };
        let picked = select(&corpus, 2, &filter, &mut rng(11));
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|q| q.tags.contains(&"graphs".to_string())));
    }

    #[test]
    fn test_auto_select_keeps_three_when_easy_drawn() {
        let corpus = vec![
            question("q1", QuestionType::Logic, Difficulty::Easy),
            question("q2", QuestionType::Math, Difficulty::Medium),
            question("q3", QuestionType::Algorithm, Difficulty::Hard),
        ];
        // Three questions over three types: every draw takes all of them.
        for seed in 0..20 {
            let picked = auto_select(&corpus, &mut rng(seed));
            assert_eq!(picked.len(), 3);
            let mut got = ids(&picked);
            got.sort_unstable();
            assert_eq!(got, vec!["q1", "q2", "q3"]);
        }
    }

    #[test]
    fn test_auto_select_trims_to_two_without_easy() {
        let corpus = vec![
            question("q1", QuestionType::Logic, Difficulty::Medium),
            question("q2", QuestionType::Math, Difficulty::Hard),
            question("q3", QuestionType::Algorithm, Difficulty::Medium),
        ];
        for seed in 0..20 {
            let picked = auto_select(&corpus, &mut rng(seed));
            assert_eq!(picked.len(), 2, "no-easy draw must shorten to 2");
        }
    }

    #[test]
    fn test_auto_select_empty_corpus() {
        assert!(auto_select(&[], &mut rng(0)).is_empty());
    }

    #[test]
    fn test_profile_derives_hard_for_senior_candidate() {
        let corpus = corpus();
        let resume = json!({ "experience_years": 8, "skills": [] });
        let picked = select_for_profile(&corpus, 2, Some(&resume), None, &mut rng(5));
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|q| q.difficulty == Difficulty::Hard));
    }

    #[test]
    fn test_profile_derives_easy_for_junior_candidate() {
        let corpus = corpus();
        let resume = json!({ "experience_years": 1 });
        let picked = select_for_profile(&corpus, 2, Some(&resume), None, &mut rng(5));
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|q| q.difficulty == Difficulty::Easy));
    }

    #[test]
    fn test_profile_skill_tags_merge_resume_and_jd() {
        let resume = json!({ "skills": ["Graphs"] });
        let jd = json!({ "skills": ["recursion", "graphs"] });
        let tags = skill_tags(Some(&resume), Some(&jd)).unwrap();
        assert_eq!(tags, vec!["graphs".to_string(), "recursion".to_string()]);
    }

    #[test]
    fn test_profile_without_payloads_is_plain_select() {
        let corpus = corpus();
        let picked = select_for_profile(&corpus, 3, None, None, &mut rng(9));
        assert_eq!(picked.len(), 3);
    }
}
