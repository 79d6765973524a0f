use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::catalog::courses::{get_course, require_course};
use crate::errors::AppError;
use crate::models::enrollment::{Enrollment, EnrollmentWithCourse};
use crate::store::{insert_record, list_records, require_record, Collection, DocumentStore, Filter};

pub async fn find_enrollment(
    store: &dyn DocumentStore,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<Option<Enrollment>, AppError> {
    let enrollments: Vec<Enrollment> = list_records(
        store,
        Collection::Enrollments,
        &Filter::all()
            .eq_id("user_id", user_id)
            .eq_id("course_id", course_id),
    )
    .await?;
    Ok(enrollments.into_iter().next())
}

/// Enrolls a user in a course. Returns the existing enrollment, and
/// `false`, when the user is already enrolled.
pub async fn enroll(
    store: &dyn DocumentStore,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<(Enrollment, bool), AppError> {
    let course = require_course(store, course_id).await?;
    if !course.is_published {
        return Err(AppError::Validation(format!(
            "Course {course_id} is not published"
        )));
    }
    if let Some(existing) = find_enrollment(store, user_id, course_id).await? {
        return Ok((existing, false));
    }

    let enrollment: Enrollment = insert_record(
        store,
        Collection::Enrollments,
        &json!({
            "user_id": user_id,
            "course_id": course_id,
            "enrolled_at": Utc::now(),
        }),
    )
    .await?;
    info!("User {user_id} enrolled in course {course_id}");
    Ok((enrollment, true))
}

/// A user's enrollments joined with their courses.
pub async fn list_by_user(
    store: &dyn DocumentStore,
    user_id: Uuid,
) -> Result<Vec<EnrollmentWithCourse>, AppError> {
    let enrollments: Vec<Enrollment> = list_records(
        store,
        Collection::Enrollments,
        &Filter::all().eq_id("user_id", user_id),
    )
    .await?;

    let mut joined = Vec::with_capacity(enrollments.len());
    for enrollment in enrollments {
        let course = get_course(store, enrollment.course_id).await?;
        joined.push(EnrollmentWithCourse { enrollment, course });
    }
    Ok(joined)
}

pub async fn list_by_course(
    store: &dyn DocumentStore,
    course_id: Uuid,
) -> Result<Vec<Enrollment>, AppError> {
    list_records(
        store,
        Collection::Enrollments,
        &Filter::all().eq_id("course_id", course_id),
    )
    .await
}

pub async fn require_enrollment(store: &dyn DocumentStore, id: Uuid) -> Result<Enrollment, AppError> {
    require_record(store, Collection::Enrollments, id, "Enrollment").await
}

pub async fn delete_enrollment(store: &dyn DocumentStore, id: Uuid) -> Result<(), AppError> {
    if !store.delete(Collection::Enrollments, id).await? {
        return Err(AppError::NotFound(format!("Enrollment {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::courses::{delete_course, set_published, tests::seed_course};
    use crate::store::MemoryDocumentStore;

    #[tokio::test]
    async fn test_enroll_is_idempotent() {
        let store = MemoryDocumentStore::new();
        let course = seed_course(&store, "C").await;
        set_published(&store, course.id, true).await.unwrap();
        let user = Uuid::new_v4();

        let (first, created) = enroll(&store, user, course.id).await.unwrap();
        assert!(created);
        let (second, created) = enroll(&store, user, course.id).await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(list_by_course(&store, course.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_enroll_rejects_drafts() {
        let store = MemoryDocumentStore::new();
        let course = seed_course(&store, "Draft").await;
        let err = enroll(&store, Uuid::new_v4(), course.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = enroll(&store, Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_user_joins_course() {
        let store = MemoryDocumentStore::new();
        let a = seed_course(&store, "A").await;
        let b = seed_course(&store, "B").await;
        for c in [&a, &b] {
            set_published(&store, c.id, true).await.unwrap();
        }
        let user = Uuid::new_v4();
        enroll(&store, user, a.id).await.unwrap();
        enroll(&store, user, b.id).await.unwrap();
        enroll(&store, Uuid::new_v4(), a.id).await.unwrap();

        let mine = list_by_user(&store, user).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].course.as_ref().unwrap().title, "A");

        // Deleting a course removes its enrollments too.
        delete_course(&store, b.id).await.unwrap();
        assert_eq!(list_by_user(&store, user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_enrollment() {
        let store = MemoryDocumentStore::new();
        let course = seed_course(&store, "C").await;
        set_published(&store, course.id, true).await.unwrap();
        let (enrollment, _) = enroll(&store, Uuid::new_v4(), course.id).await.unwrap();

        delete_enrollment(&store, enrollment.id).await.unwrap();
        assert!(matches!(
            delete_enrollment(&store, enrollment.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
