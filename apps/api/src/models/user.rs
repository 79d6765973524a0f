use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Instructor,
    #[default]
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Subject id issued by the identity provider.
    pub auth_user_id: String,
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub onboarding_completed: bool,
    pub onboarding_completed_at: Option<DateTime<Utc>>,
    // Student fields
    pub student_type: Option<String>,
    pub career_interest: Option<String>,
    pub current_level: Option<SkillLevel>,
    pub learning_goals: Option<String>,
    // Instructor fields
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub qualifications: Option<String>,
    pub years_of_experience: Option<u32>,
    // Admin-issued verification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_id: Option<String>,
    #[serde(default)]
    pub verification_id_used: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The record as its owner may see it. The verification id reaches the
    /// student by email only.
    pub fn without_verification_id(mut self) -> Self {
        self.verification_id = None;
        self
    }

    pub fn safe_profile(&self) -> SafeProfile {
        SafeProfile {
            id: self.id,
            auth_user_id: self.auth_user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            onboarding_completed: self.onboarding_completed,
            verification_id_used: self.verification_id_used,
        }
    }
}

/// The subset of a user record exposed to layouts and route guards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafeProfile {
    pub id: Uuid,
    pub auth_user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub onboarding_completed: bool,
    pub verification_id_used: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub auth_user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<Role>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_interest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_level: Option<SkillLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_goals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_id_used: Option<bool>,
}
