//! Onboarding as an explicit state machine.
//!
//! student:    Profile → StudentDetails → Assessment → Complete
//! instructor: Profile → InstructorDetails → Complete
//! admin:      Profile → Complete
//!
//! The step is never stored. It is derived from the user record (and whether
//! an assessment exists), and every onboarding write checks its transition
//! against the derived step first.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::accounts::users::{completed_patch, patch_user};
use crate::errors::AppError;
use crate::models::onboarding::OnboardingRecord;
use crate::models::user::{Role, SkillLevel, User, UserPatch};
use crate::store::{insert_record, list_records, Collection, DocumentStore, Filter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Profile,
    StudentDetails,
    InstructorDetails,
    Assessment,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingEvent {
    ProfileSubmitted,
    StudentDetailsSubmitted,
    InstructorDetailsSubmitted,
    AssessmentSubmitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {event:?} at onboarding step {step:?} for a {role} account")]
pub struct TransitionError {
    pub step: OnboardingStep,
    pub event: OnboardingEvent,
    pub role: &'static str,
}

impl OnboardingStep {
    pub fn apply(self, role: Role, event: OnboardingEvent) -> Result<Self, TransitionError> {
        use OnboardingEvent::*;
        use OnboardingStep::*;

        match (self, role, event) {
            (Profile, Role::Student, ProfileSubmitted) => Ok(StudentDetails),
            (Profile, Role::Instructor, ProfileSubmitted) => Ok(InstructorDetails),
            (Profile, Role::Admin, ProfileSubmitted) => Ok(Complete),
            (StudentDetails, Role::Student, StudentDetailsSubmitted) => Ok(Assessment),
            (InstructorDetails, Role::Instructor, InstructorDetailsSubmitted) => Ok(Complete),
            (Assessment, Role::Student, AssessmentSubmitted) => Ok(Complete),
            _ => Err(TransitionError {
                step: self,
                event,
                role: role.as_str(),
            }),
        }
    }

    /// Derives the current step from persisted state.
    pub fn current(user: &User, has_assessment: bool) -> Self {
        let has_name = user
            .name
            .as_deref()
            .map(|n| !n.trim().is_empty())
            .unwrap_or(false);
        if !has_name {
            return OnboardingStep::Profile;
        }
        match user.role {
            Role::Admin => OnboardingStep::Complete,
            Role::Instructor => {
                if user.onboarding_completed && user.specialization.is_some() {
                    OnboardingStep::Complete
                } else {
                    OnboardingStep::InstructorDetails
                }
            }
            Role::Student => {
                if !user.onboarding_completed || user.student_type.is_none() {
                    OnboardingStep::StudentDetails
                } else if !has_assessment {
                    OnboardingStep::Assessment
                } else {
                    OnboardingStep::Complete
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub step: OnboardingStep,
    pub role: Role,
    pub onboarding_completed: bool,
}

async fn has_assessment(store: &dyn DocumentStore, user: &User) -> Result<bool, AppError> {
    Ok(!store
        .list(Collection::Assessments, &Filter::all().eq_id("user_id", user.id))
        .await?
        .is_empty())
}

pub async fn current_step(store: &dyn DocumentStore, user: &User) -> Result<OnboardingStep, AppError> {
    Ok(OnboardingStep::current(user, has_assessment(store, user).await?))
}

pub async fn onboarding_status(
    store: &dyn DocumentStore,
    user: &User,
) -> Result<OnboardingStatus, AppError> {
    Ok(OnboardingStatus {
        step: current_step(store, user).await?,
        role: user.role,
        onboarding_completed: user.onboarding_completed,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Step submissions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSubmission {
    pub name: String,
    /// Self-service role choice; admin is only granted by another admin.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentDetailsSubmission {
    pub student_type: String,
    pub learning_goals: String,
    pub career_interest: Option<String>,
    pub current_level: Option<SkillLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstructorDetailsSubmission {
    pub full_name: String,
    pub specialization: String,
    pub bio: String,
    /// Free text from the form; non-numeric input counts as 0 years.
    pub experience: String,
    pub qualifications: String,
}

pub async fn submit_profile(
    store: &dyn DocumentStore,
    user: &User,
    submission: &ProfileSubmission,
) -> Result<OnboardingStatus, AppError> {
    let name = submission.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    let role = match submission.role {
        Some(Role::Admin) if user.role != Role::Admin => {
            return Err(AppError::Validation(
                "role must be 'student' or 'instructor'".into(),
            ))
        }
        Some(role) => role,
        None => user.role,
    };

    let step = current_step(store, user).await?;
    let next = step.apply(role, OnboardingEvent::ProfileSubmitted)?;

    let mut patch = if next == OnboardingStep::Complete {
        completed_patch()
    } else {
        UserPatch::default()
    };
    patch.name = Some(name.to_string());
    patch.role = Some(role);
    let user = patch_user(store, user.id, &patch).await?;

    create_onboarding_record(store, &user.auth_user_id, Some(name)).await?;
    info!("User {} onboarding: {:?} -> {:?}", user.id, step, next);

    onboarding_status(store, &user).await
}

pub async fn submit_student_details(
    store: &dyn DocumentStore,
    user: &User,
    submission: &StudentDetailsSubmission,
) -> Result<OnboardingStatus, AppError> {
    let student_type = submission.student_type.trim();
    if student_type.is_empty() {
        return Err(AppError::Validation("student_type must not be empty".into()));
    }

    let step = current_step(store, user).await?;
    let next = step.apply(user.role, OnboardingEvent::StudentDetailsSubmitted)?;

    let mut patch = completed_patch();
    patch.student_type = Some(student_type.to_string());
    patch.learning_goals = Some(submission.learning_goals.clone());
    patch.career_interest = submission.career_interest.clone();
    patch.current_level = submission.current_level;
    let user = patch_user(store, user.id, &patch).await?;

    info!("User {} onboarding: {:?} -> {:?}", user.id, step, next);
    onboarding_status(store, &user).await
}

pub async fn submit_instructor_details(
    store: &dyn DocumentStore,
    user: &User,
    submission: &InstructorDetailsSubmission,
) -> Result<OnboardingStatus, AppError> {
    if submission.specialization.trim().is_empty() {
        return Err(AppError::Validation("specialization must not be empty".into()));
    }

    let step = current_step(store, user).await?;
    let next = step.apply(user.role, OnboardingEvent::InstructorDetailsSubmitted)?;

    let mut patch = completed_patch();
    if !submission.full_name.trim().is_empty() {
        patch.name = Some(submission.full_name.trim().to_string());
    }
    patch.specialization = Some(submission.specialization.trim().to_string());
    patch.bio = Some(submission.bio.clone());
    patch.qualifications = Some(submission.qualifications.clone());
    patch.years_of_experience = Some(parse_years(&submission.experience));
    let user = patch_user(store, user.id, &patch).await?;

    info!("User {} onboarding: {:?} -> {:?}", user.id, step, next);
    onboarding_status(store, &user).await
}

fn parse_years(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

// ────────────────────────────────────────────────────────────────────────────
// Onboarding records
// ────────────────────────────────────────────────────────────────────────────

pub async fn create_onboarding_record(
    store: &dyn DocumentStore,
    auth_user_id: &str,
    name: Option<&str>,
) -> Result<OnboardingRecord, AppError> {
    insert_record(
        store,
        Collection::Onboardings,
        &serde_json::json!({
            "auth_user_id": auth_user_id,
            "name": name,
            "completed_at": Utc::now(),
        }),
    )
    .await
}

pub async fn find_onboarding_record(
    store: &dyn DocumentStore,
    auth_user_id: &str,
) -> Result<Option<OnboardingRecord>, AppError> {
    let records: Vec<OnboardingRecord> = list_records(
        store,
        Collection::Onboardings,
        &Filter::all().eq("auth_user_id", auth_user_id),
    )
    .await?;
    Ok(records.into_iter().next())
}
