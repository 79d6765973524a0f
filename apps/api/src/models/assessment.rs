use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::questions::{CareerPath, QuestionId};
use crate::assessment::scoring::PathScores;

/// What is persisted per answer: never the raw option object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnsweredQuestion {
    pub question_id: QuestionId,
    pub selected_option: String,
    /// `None` when the selection matched no option and was skipped.
    pub selected_path: Option<CareerPath>,
}

/// One stored assessment result. A user has at most one; a retake replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recommended_path: CareerPath,
    pub path_scores: PathScores,
    pub answers: Vec<AnsweredQuestion>,
    pub analysis: String,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentBody<'a> {
    pub user_id: Uuid,
    pub recommended_path: CareerPath,
    pub path_scores: &'a PathScores,
    pub answers: &'a [AnsweredQuestion],
    pub analysis: &'a str,
    pub completed_at: DateTime<Utc>,
}
