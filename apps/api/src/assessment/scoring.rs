//! Path scoring: turns a completed answer set into a career path recommendation.
//!
//! Algorithm:
//! 1. Every path starts at zero.
//! 2. For each question, resolve the selection to one of its options and add
//!    the option's points to that option's path.
//! 3. The recommendation is the highest-scoring path. On a tie the earliest
//!    path in `CareerPath::ALL` wins.
//!
//! Pure function of its input and the static question bank: no I/O, no state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assessment::analysis::generate_analysis;
use crate::assessment::questions::{question, AnswerOption, CareerPath, Question, QuestionId, QUESTIONS};
use crate::models::assessment::AnsweredQuestion;

/// A selected answer: either the option's stable position within its
/// question (preferred) or its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Index(usize),
    Text(String),
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Index(i) => write!(f, "option #{i}"),
            Selection::Text(t) => write!(f, "'{t}'"),
        }
    }
}

pub type AnswerSet = BTreeMap<QuestionId, Selection>;

/// What to do with a selection that matches none of its question's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedOptionPolicy {
    /// Contribute no points and carry on.
    #[default]
    Skip,
    /// Fail with `ScoringError::UnknownOption`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("incomplete answer set: missing answers for questions {missing:?}")]
    IncompleteAnswerSet { missing: Vec<QuestionId> },

    #[error("unknown option for question {question_id}: {selection}")]
    UnknownOption {
        question_id: QuestionId,
        selection: String,
    },

    #[error("unknown question id {0}")]
    UnknownQuestion(QuestionId),
}

/// Accumulated points per path. One field per path, so a score map can
/// never gain or lose a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathScores {
    pub frontend: u32,
    pub backend: u32,
    pub fullstack: u32,
    pub data_science: u32,
    pub devops: u32,
}

impl PathScores {
    pub fn get(&self, path: CareerPath) -> u32 {
        match path {
            CareerPath::Frontend => self.frontend,
            CareerPath::Backend => self.backend,
            CareerPath::Fullstack => self.fullstack,
            CareerPath::DataScience => self.data_science,
            CareerPath::Devops => self.devops,
        }
    }

    pub fn add(&mut self, path: CareerPath, points: u32) {
        let slot = match path {
            CareerPath::Frontend => &mut self.frontend,
            CareerPath::Backend => &mut self.backend,
            CareerPath::Fullstack => &mut self.fullstack,
            CareerPath::DataScience => &mut self.data_science,
            CareerPath::Devops => &mut self.devops,
        };
        *slot = slot.saturating_add(points);
    }

    /// Highest-scoring path; the first in enumeration order among equals.
    pub fn recommended(&self) -> CareerPath {
        let mut best = CareerPath::ALL[0];
        for path in &CareerPath::ALL[1..] {
            if self.get(*path) > self.get(best) {
                best = *path;
            }
        }
        best
    }
}

#[cfg(test)]
impl PathScores {
    pub fn total(&self) -> u32 {
        CareerPath::ALL.iter().map(|p| self.get(*p)).sum()
    }

    pub fn max(&self) -> u32 {
        CareerPath::ALL.iter().map(|p| self.get(*p)).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub recommended_path: CareerPath,
    pub path_scores: PathScores,
    pub analysis: String,
    pub answers: Vec<AnsweredQuestion>,
}

/// Resolves a selection to one of the question's options.
pub fn resolve<'q>(question: &'q Question, selection: &Selection) -> Option<&'q AnswerOption> {
    match selection {
        Selection::Index(i) => question.options.get(*i),
        Selection::Text(text) => question.options.iter().find(|o| o.text == text.as_str()),
    }
}

/// Unvalidated accumulation. Answers for unknown questions and unmatched
/// selections contribute nothing; an empty set yields all zeros.
pub fn tally(answers: &AnswerSet) -> PathScores {
    let mut scores = PathScores::default();
    for (id, selection) in answers {
        if let Some(option) = question(*id).and_then(|q| resolve(q, selection)) {
            scores.add(option.path, option.points);
        }
    }
    scores
}

/// Scores a complete answer set against the question bank.
pub fn score_answers(
    answers: &AnswerSet,
    policy: UnmatchedOptionPolicy,
) -> Result<Recommendation, ScoringError> {
    if let Some(unknown) = answers.keys().find(|id| question(**id).is_none()) {
        return Err(ScoringError::UnknownQuestion(*unknown));
    }

    let missing: Vec<QuestionId> = QUESTIONS
        .iter()
        .map(|q| q.id)
        .filter(|id| !answers.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(ScoringError::IncompleteAnswerSet { missing });
    }

    let mut answered = Vec::with_capacity(QUESTIONS.len());

    for q in &QUESTIONS {
        // Presence checked above
        let Some(selection) = answers.get(&q.id) else {
            continue;
        };
        match resolve(q, selection) {
            Some(option) => {
                answered.push(AnsweredQuestion {
                    question_id: q.id,
                    selected_option: option.text.to_string(),
                    selected_path: Some(option.path),
                });
            }
            None if policy == UnmatchedOptionPolicy::Reject => {
                return Err(ScoringError::UnknownOption {
                    question_id: q.id,
                    selection: selection.to_string(),
                });
            }
            None => {
                tracing::warn!("question {}: {} matches no option, skipped", q.id, selection);
                answered.push(AnsweredQuestion {
                    question_id: q.id,
                    selected_option: match selection {
                        Selection::Text(t) => t.clone(),
                        Selection::Index(i) => i.to_string(),
                    },
                    selected_path: None,
                });
            }
        }
    }

    // Every answer is now known to resolve or to be a tolerated skip
    let path_scores = tally(answers);
    let recommended_path = path_scores.recommended();
    Ok(Recommendation {
        recommended_path,
        path_scores,
        analysis: generate_analysis(recommended_path),
        answers: answered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Picks the first option tagged `path` on every question, falling back
    /// to the first option where the question has none.
    fn answers_for(path: CareerPath) -> AnswerSet {
        QUESTIONS
            .iter()
            .map(|q| {
                let idx = q.options.iter().position(|o| o.path == path).unwrap_or(0);
                (q.id, Selection::Text(q.options[idx].text.to_string()))
            })
            .collect()
    }

    fn all_unmatched() -> AnswerSet {
        QUESTIONS
            .iter()
            .map(|q| (q.id, Selection::Text("no such option".to_string())))
            .collect()
    }

    #[test]
    fn test_all_frontend_recommends_frontend() {
        let rec = score_answers(&answers_for(CareerPath::Frontend), UnmatchedOptionPolicy::Skip).unwrap();
        // Eight questions at 3, question 6 at 2, question 8 at 1
        assert_eq!(rec.path_scores.frontend, 27);
        assert_eq!(rec.recommended_path, CareerPath::Frontend);
        for p in &CareerPath::ALL[1..] {
            assert!(rec.path_scores.frontend > rec.path_scores.get(*p));
        }
    }

    #[test]
    fn test_all_data_science_scores_thirty() {
        let rec = score_answers(&answers_for(CareerPath::DataScience), UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(rec.path_scores.data_science, 30);
        assert_eq!(rec.recommended_path, CareerPath::DataScience);
    }

    #[test]
    fn test_total_equals_sum_of_selected_weights() {
        let mut answers = AnswerSet::new();
        let mut expected = 0;
        for (i, q) in QUESTIONS.iter().enumerate() {
            let opt = &q.options[i % q.options.len()];
            expected += opt.points;
            answers.insert(q.id, Selection::Text(opt.text.to_string()));
        }
        let rec = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(rec.path_scores.total(), expected);
    }

    #[test]
    fn test_recommended_path_has_max_score() {
        for offset in 0..4 {
            let answers: AnswerSet = QUESTIONS
                .iter()
                .enumerate()
                .map(|(i, q)| (q.id, Selection::Index((i + offset) % q.options.len())))
                .collect();
            let rec = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap();
            assert_eq!(rec.path_scores.get(rec.recommended_path), rec.path_scores.max());
        }
    }

    #[test]
    fn test_index_and_text_selections_agree() {
        let by_index: AnswerSet = QUESTIONS.iter().map(|q| (q.id, Selection::Index(2))).collect();
        let by_text: AnswerSet = QUESTIONS
            .iter()
            .map(|q| (q.id, Selection::Text(q.options[2].text.to_string())))
            .collect();
        let a = score_answers(&by_index, UnmatchedOptionPolicy::Reject).unwrap();
        let b = score_answers(&by_text, UnmatchedOptionPolicy::Reject).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.recommended_path, CareerPath::Fullstack);
    }

    #[test]
    fn test_scoring_is_order_independent() {
        // Same (path, weight) pairs land on different questions
        let mut first = answers_for(CareerPath::Backend);
        first.insert(1, Selection::Index(0)); // frontend 3
        first.insert(2, Selection::Index(1)); // backend 3
        let mut second = answers_for(CareerPath::Backend);
        second.insert(1, Selection::Index(1)); // backend 3
        second.insert(2, Selection::Index(0)); // frontend 3
        let a = score_answers(&first, UnmatchedOptionPolicy::Skip).unwrap();
        let b = score_answers(&second, UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(a.path_scores, b.path_scores);
    }

    #[test]
    fn test_idempotent() {
        let answers = answers_for(CareerPath::Fullstack);
        let a = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap();
        let b = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_zero_tie_resolves_to_frontend() {
        let rec = score_answers(&all_unmatched(), UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(rec.path_scores, PathScores::default());
        assert_eq!(rec.recommended_path, CareerPath::Frontend);
        assert!(rec.analysis.contains("Frontend Development"));
        assert!(rec.answers.iter().all(|a| a.selected_path.is_none()));
    }

    #[test]
    fn test_tie_break_uses_enumeration_order() {
        // backend 3 + data_science 3, everything else unmatched
        let mut answers = all_unmatched();
        answers.insert(1, Selection::Index(3)); // data_science
        answers.insert(2, Selection::Index(1)); // backend
        let rec = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(rec.path_scores.backend, 3);
        assert_eq!(rec.path_scores.data_science, 3);
        assert_eq!(rec.recommended_path, CareerPath::Backend);
    }

    #[test]
    fn test_devops_reachable_when_only_question_four_matches() {
        let mut answers = all_unmatched();
        answers.insert(4, Selection::Index(1));
        let rec = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(rec.recommended_path, CareerPath::Devops);
        assert_eq!(rec.path_scores.devops, 3);
    }

    #[test]
    fn test_incomplete_answer_set_rejected() {
        let mut answers = answers_for(CareerPath::Frontend);
        answers.remove(&3);
        answers.remove(&9);
        let err = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap_err();
        assert_eq!(err, ScoringError::IncompleteAnswerSet { missing: vec![3, 9] });
    }

    #[test]
    fn test_empty_answer_set_rejected_not_panicking() {
        let err = score_answers(&AnswerSet::new(), UnmatchedOptionPolicy::Skip).unwrap_err();
        assert!(matches!(err, ScoringError::IncompleteAnswerSet { ref missing } if missing.len() == 10));
    }

    #[test]
    fn test_unknown_question_rejected() {
        let mut answers = answers_for(CareerPath::Frontend);
        answers.insert(42, Selection::Index(0));
        assert_eq!(
            score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap_err(),
            ScoringError::UnknownQuestion(42)
        );
    }

    #[test]
    fn test_reject_policy_fails_on_unmatched_text() {
        let mut answers = answers_for(CareerPath::Frontend);
        answers.insert(5, Selection::Text("Stale option text".into()));
        let err = score_answers(&answers, UnmatchedOptionPolicy::Reject).unwrap_err();
        assert!(matches!(err, ScoringError::UnknownOption { question_id: 5, .. }));
    }

    #[test]
    fn test_out_of_range_index_is_unmatched() {
        let mut answers = answers_for(CareerPath::Frontend);
        answers.insert(1, Selection::Index(9));
        let rec = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(rec.path_scores.frontend, 24);
        assert!(score_answers(&answers, UnmatchedOptionPolicy::Reject).is_err());
    }

    #[test]
    fn test_answers_record_option_text_and_path() {
        let rec = score_answers(&answers_for(CareerPath::Backend), UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(rec.answers.len(), 10);
        let q4 = rec.answers.iter().find(|a| a.question_id == 4).unwrap();
        // Question 4 has no backend option; the helper picked its first option
        assert_eq!(q4.selected_path, Some(CareerPath::Frontend));
        assert_eq!(q4.selected_option, "Designing user experiences and interfaces");
    }

    #[test]
    fn test_tally_empty_is_all_zero() {
        let scores = tally(&AnswerSet::new());
        assert_eq!(scores.total(), 0);
        assert_eq!(scores.recommended(), CareerPath::Frontend);
    }

    #[test]
    fn test_tally_matches_validated_scoring() {
        let answers = answers_for(CareerPath::DataScience);
        let rec = score_answers(&answers, UnmatchedOptionPolicy::Skip).unwrap();
        assert_eq!(tally(&answers), rec.path_scores);
    }

    #[test]
    fn test_selection_json_forms() {
        let answers: AnswerSet =
            serde_json::from_str(r#"{"1": 0, "2": "By writing efficient algorithms and logic"}"#).unwrap();
        assert_eq!(answers[&1], Selection::Index(0));
        assert!(matches!(answers[&2], Selection::Text(_)));
    }

    #[test]
    fn test_path_scores_serialize_exactly_five_keys() {
        let v = serde_json::to_value(PathScores::default()).unwrap();
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 5);
        for p in CareerPath::ALL {
            assert!(keys.contains(&p.as_str().to_string()));
        }
    }
}
