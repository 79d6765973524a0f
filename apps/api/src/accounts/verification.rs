use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::accounts::users::{list_by_role, patch_user, require_user};
use crate::errors::AppError;
use crate::models::user::{Role, User, UserPatch};
use crate::store::DocumentStore;

#[derive(Debug, Clone, Serialize)]
pub struct IssuedVerification {
    pub user_id: Uuid,
    pub verification_id: String,
    pub email: String,
    pub name: Option<String>,
}

/// Formats an id as `DD/MM/keekNN`, e.g. `26/01/keek01`.
pub fn format_verification_id(issued_at: DateTime<Utc>, sequence: usize) -> String {
    format!("{}/keek{:02}", issued_at.format("%d/%m"), sequence)
}

/// Issues a verification id to a student. The sequence number is one more
/// than the number of other students already holding an id.
pub async fn issue_verification_id(
    store: &dyn DocumentStore,
    student_id: Uuid,
    issued_at: DateTime<Utc>,
) -> Result<IssuedVerification, AppError> {
    let student = require_user(store, student_id).await?;
    if student.role != Role::Student {
        return Err(AppError::Validation(format!(
            "User {student_id} is not a student; only students are verified"
        )));
    }

    let already_issued = list_by_role(store, Role::Student)
        .await?
        .iter()
        .filter(|u| u.id != student_id && u.verification_id.is_some())
        .count();
    let verification_id = format_verification_id(issued_at, already_issued + 1);

    let student = patch_user(
        store,
        student_id,
        &UserPatch {
            verification_id: Some(verification_id.clone()),
            verification_id_used: Some(false),
            ..Default::default()
        },
    )
    .await?;

    info!("Issued verification id {verification_id} to student {student_id}");
    Ok(IssuedVerification {
        user_id: student.id,
        verification_id,
        email: student.email,
        name: student.name,
    })
}

/// Redeems the caller's verification id. Redeeming twice is a no-op.
pub async fn redeem_verification_id(
    store: &dyn DocumentStore,
    user: &User,
    submitted: &str,
) -> Result<User, AppError> {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        return Err(AppError::Validation("Please enter your verification ID".into()));
    }
    if user.verification_id.as_deref() != Some(submitted) {
        return Err(AppError::Validation(
            "Invalid verification ID. Please check and try again.".into(),
        ));
    }
    if user.verification_id_used {
        return Ok(user.clone());
    }

    let user = patch_user(
        store,
        user.id,
        &UserPatch {
            verification_id_used: Some(true),
            ..Default::default()
        },
    )
    .await?;
    info!("User {} redeemed their verification id", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::users::tests::seed_user;
    use crate::store::MemoryDocumentStore;
    use chrono::TimeZone;

    fn jan_26() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 26, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_format() {
        assert_eq!(format_verification_id(jan_26(), 1), "26/01/keek01");
        assert_eq!(format_verification_id(jan_26(), 12), "26/01/keek12");
        assert_eq!(format_verification_id(jan_26(), 104), "26/01/keek104");
    }

    #[tokio::test]
    async fn test_sequence_counts_other_issued_students() {
        let store = MemoryDocumentStore::new();
        let a = seed_user(&store, "a", Role::Student).await;
        let b = seed_user(&store, "b", Role::Student).await;
        seed_user(&store, "t", Role::Instructor).await;

        let first = issue_verification_id(&store, a.id, jan_26()).await.unwrap();
        let second = issue_verification_id(&store, b.id, jan_26()).await.unwrap();
        assert_eq!(first.verification_id, "26/01/keek01");
        assert_eq!(second.verification_id, "26/01/keek02");

        // Reissuing to an already-issued student does not count itself
        let again = issue_verification_id(&store, a.id, jan_26()).await.unwrap();
        assert_eq!(again.verification_id, "26/01/keek02");
    }

    #[tokio::test]
    async fn test_only_students_are_issued() {
        let store = MemoryDocumentStore::new();
        let t = seed_user(&store, "t", Role::Instructor).await;
        let err = issue_verification_id(&store, t.id, jan_26()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_redeem_flow() {
        let store = MemoryDocumentStore::new();
        let s = seed_user(&store, "s", Role::Student).await;
        issue_verification_id(&store, s.id, jan_26()).await.unwrap();
        let s = require_user(&store, s.id).await.unwrap();

        assert!(redeem_verification_id(&store, &s, "26/01/keek99").await.is_err());
        assert!(redeem_verification_id(&store, &s, "   ").await.is_err());

        let verified = redeem_verification_id(&store, &s, " 26/01/keek01 ").await.unwrap();
        assert!(verified.verification_id_used);
        let again = redeem_verification_id(&store, &verified, "26/01/keek01").await.unwrap();
        assert!(again.verification_id_used);
    }

    #[tokio::test]
    async fn test_redeem_without_issued_id_fails() {
        let store = MemoryDocumentStore::new();
        let s = seed_user(&store, "s", Role::Student).await;
        assert!(redeem_verification_id(&store, &s, "26/01/keek01").await.is_err());
    }
}
