//! Access policy: the one place that decides who may see which area and
//! perform which mutation. Route guards and handlers consult it; nothing
//! else compares roles.

use serde::{Deserialize, Serialize};

use crate::models::user::{Role, SafeProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Dashboard,
    AdminConsole,
    InstructorConsole,
    StudentConsole,
    Assessment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "location", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageUsers,
    IssueVerification,
    ManageCatalog,
    Enroll,
    RecordProgress,
    TakeAssessment,
}

/// Route guard decision for `area`. `None` means the caller has no profile.
pub fn authorize(profile: Option<&SafeProfile>, area: Area) -> Decision {
    let Some(profile) = profile else {
        return match area {
            Area::Dashboard => Decision::Redirect("/"),
            _ => Decision::Redirect("/sign-in"),
        };
    };

    match area {
        Area::Assessment => Decision::Allow,
        Area::Dashboard => student_gate(profile).unwrap_or(Decision::Allow),
        Area::AdminConsole => {
            if profile.role == Role::Admin {
                Decision::Allow
            } else {
                Decision::Redirect("/")
            }
        }
        Area::InstructorConsole => {
            if profile.role != Role::Instructor {
                Decision::Redirect("/")
            } else if !profile.onboarding_completed {
                Decision::Redirect("/onboarding")
            } else {
                Decision::Allow
            }
        }
        Area::StudentConsole => {
            if profile.role != Role::Student {
                Decision::Redirect("/")
            } else {
                student_gate(profile).unwrap_or(Decision::Allow)
            }
        }
    }
}

/// Students must redeem a verification id, then finish onboarding.
fn student_gate(profile: &SafeProfile) -> Option<Decision> {
    if profile.role != Role::Student {
        return None;
    }
    if !profile.verification_id_used {
        return Some(Decision::Redirect("/verify-id"));
    }
    if !profile.onboarding_completed {
        return Some(Decision::Redirect("/student-onboarding"));
    }
    None
}

/// Whether `role` may perform `action`. Admins may do everything.
pub fn permits(role: Role, action: Action) -> bool {
    match role {
        Role::Admin => true,
        Role::Instructor => matches!(action, Action::ManageCatalog),
        Role::Student => matches!(
            action,
            Action::Enroll | Action::RecordProgress | Action::TakeAssessment
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(role: Role, verified: bool, onboarded: bool) -> SafeProfile {
        SafeProfile {
            id: Uuid::new_v4(),
            auth_user_id: "auth".into(),
            email: "e@x.io".into(),
            name: None,
            role,
            onboarding_completed: onboarded,
            verification_id_used: verified,
        }
    }

    #[test]
    fn test_anonymous_redirects() {
        assert_eq!(authorize(None, Area::Dashboard), Decision::Redirect("/"));
        assert_eq!(authorize(None, Area::AdminConsole), Decision::Redirect("/sign-in"));
        assert_eq!(authorize(None, Area::Assessment), Decision::Redirect("/sign-in"));
    }

    #[test]
    fn test_unverified_student_goes_to_verify_id() {
        let p = profile(Role::Student, false, true);
        assert_eq!(authorize(Some(&p), Area::Dashboard), Decision::Redirect("/verify-id"));
        assert_eq!(authorize(Some(&p), Area::StudentConsole), Decision::Redirect("/verify-id"));
    }

    #[test]
    fn test_verified_student_without_onboarding() {
        let p = profile(Role::Student, true, false);
        assert_eq!(
            authorize(Some(&p), Area::Dashboard),
            Decision::Redirect("/student-onboarding")
        );
    }

    #[test]
    fn test_ready_student() {
        let p = profile(Role::Student, true, true);
        assert_eq!(authorize(Some(&p), Area::Dashboard), Decision::Allow);
        assert_eq!(authorize(Some(&p), Area::StudentConsole), Decision::Allow);
        assert_eq!(authorize(Some(&p), Area::AdminConsole), Decision::Redirect("/"));
        assert_eq!(authorize(Some(&p), Area::InstructorConsole), Decision::Redirect("/"));
    }

    #[test]
    fn test_instructor_console_requires_onboarding() {
        let p = profile(Role::Instructor, false, false);
        assert_eq!(
            authorize(Some(&p), Area::InstructorConsole),
            Decision::Redirect("/onboarding")
        );
        // Verification applies to students only
        assert_eq!(authorize(Some(&p), Area::Dashboard), Decision::Allow);
    }

    #[test]
    fn test_admin_console() {
        let p = profile(Role::Admin, false, false);
        assert_eq!(authorize(Some(&p), Area::AdminConsole), Decision::Allow);
        assert_eq!(authorize(Some(&p), Area::StudentConsole), Decision::Redirect("/"));
    }

    #[test]
    fn test_permissions() {
        assert!(permits(Role::Admin, Action::ManageUsers));
        assert!(permits(Role::Admin, Action::TakeAssessment));
        assert!(permits(Role::Instructor, Action::ManageCatalog));
        assert!(!permits(Role::Instructor, Action::IssueVerification));
        assert!(permits(Role::Student, Action::Enroll));
        assert!(!permits(Role::Student, Action::ManageCatalog));
    }

    #[test]
    fn test_decision_json_shape() {
        assert_eq!(
            serde_json::to_value(Decision::Redirect("/verify-id")).unwrap(),
            serde_json::json!({"decision": "redirect", "location": "/verify-id"})
        );
        assert_eq!(
            serde_json::to_value(Decision::Allow).unwrap(),
            serde_json::json!({"decision": "allow"})
        );
    }
}
