use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<f64>,
    #[serde(default)]
    pub is_published: bool,
    /// e.g. "IT", "Business", "General"
    pub course_type: Option<String>,
    /// Student types this course targets. Empty means everyone.
    #[serde(default)]
    pub target_student_types: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn is_visible_to(&self, student_type: Option<&str>) -> bool {
        if !self.is_published {
            return false;
        }
        if self.target_student_types.is_empty() {
            return true;
        }
        student_type
            .map(|t| self.target_student_types.iter().any(|s| s == t))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_student_types: Option<Vec<String>>,
}
