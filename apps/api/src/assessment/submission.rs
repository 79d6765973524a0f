//! Persisting assessment results. A user has at most one assessment; a
//! retake overwrites it in place and removes any stray duplicates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::accounts::onboarding::{current_step, OnboardingEvent, OnboardingStep};
use crate::accounts::users::find_by_auth_id;
use crate::assessment::scoring::{score_answers, AnswerSet, UnmatchedOptionPolicy};
use crate::errors::AppError;
use crate::models::assessment::{AssessmentBody, AssessmentRecord};
use crate::store::{insert_record, list_records, patch_record, Collection, DocumentStore, Filter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub status: SubmissionStatus,
    pub assessment: AssessmentRecord,
    /// Onboarding step after this submission.
    pub onboarding_step: OnboardingStep,
}

/// Scores `answers` for the user behind `auth_user_id` and stores the result.
///
/// Nothing is written when scoring fails.
pub async fn submit_assessment(
    store: &dyn DocumentStore,
    auth_user_id: &str,
    answers: &AnswerSet,
    policy: UnmatchedOptionPolicy,
    completed_at: DateTime<Utc>,
) -> Result<SubmissionOutcome, AppError> {
    let user = find_by_auth_id(store, auth_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{auth_user_id}' not found")))?;

    let recommendation = score_answers(answers, policy)?;
    let step_before = current_step(store, &user).await?;

    let body = AssessmentBody {
        user_id: user.id,
        recommended_path: recommendation.recommended_path,
        path_scores: &recommendation.path_scores,
        answers: &recommendation.answers,
        analysis: &recommendation.analysis,
        completed_at,
    };

    let existing = all_for_user(store, user.id).await?;
    let (status, assessment) = match existing.split_first() {
        None => {
            let record: AssessmentRecord =
                insert_record(store, Collection::Assessments, &body).await?;
            (SubmissionStatus::Created, record)
        }
        Some((current, stray)) => {
            let record: AssessmentRecord =
                patch_record(store, Collection::Assessments, current.id, &body).await?;
            for duplicate in stray {
                warn!(
                    "Removing duplicate assessment {} for user {}",
                    duplicate.id, user.id
                );
                store.delete(Collection::Assessments, duplicate.id).await?;
            }
            (SubmissionStatus::Updated, record)
        }
    };

    info!(
        "Assessment {:?} for user {}: recommended {}",
        status,
        user.id,
        assessment.recommended_path.as_str()
    );

    let onboarding_step = match step_before.apply(user.role, OnboardingEvent::AssessmentSubmitted) {
        Ok(next) => {
            info!("User {} onboarding {:?} -> {:?}", user.id, step_before, next);
            next
        }
        // Retakes outside onboarding are fine; the step is unchanged.
        Err(_) => current_step(store, &user).await?,
    };

    Ok(SubmissionOutcome {
        status,
        assessment,
        onboarding_step,
    })
}

/// All of a user's assessments, newest first.
pub async fn all_for_user(
    store: &dyn DocumentStore,
    user_id: Uuid,
) -> Result<Vec<AssessmentRecord>, AppError> {
    let mut records: Vec<AssessmentRecord> = list_records(
        store,
        Collection::Assessments,
        &Filter::all().eq_id("user_id", user_id),
    )
    .await?;
    records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    Ok(records)
}

pub async fn latest_for_user(
    store: &dyn DocumentStore,
    user_id: Uuid,
) -> Result<Option<AssessmentRecord>, AppError> {
    Ok(all_for_user(store, user_id).await?.into_iter().next())
}

/// Removes the user's latest assessment and returns its id.
pub async fn delete_latest_for_user(store: &dyn DocumentStore, user_id: Uuid) -> Result<Uuid, AppError> {
    let latest = latest_for_user(store, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No assessment for user {user_id}")))?;
    store.delete(Collection::Assessments, latest.id).await?;
    info!("Deleted assessment {} for user {user_id}", latest.id);
    Ok(latest.id)
}
