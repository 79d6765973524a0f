use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::catalog::chapters::{delete_chapter, list_by_course};
use crate::errors::AppError;
use crate::models::course::{Course, CoursePatch, NewCourse};
use crate::store::{
    delete_where, get_record, insert_record, list_records, patch_record, require_record,
    Collection, DocumentStore, Filter,
};

/// New courses start unpublished and untargeted.
pub async fn create_course(store: &dyn DocumentStore, new: &NewCourse) -> Result<Course, AppError> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    let course: Course = insert_record(
        store,
        Collection::Courses,
        &json!({
            "title": title,
            "description": new.description,
            "image_url": new.image_url,
            "category_id": new.category_id,
            "is_published": false,
            "target_student_types": [],
        }),
    )
    .await?;
    info!("Created course {} '{}'", course.id, course.title);
    Ok(course)
}

pub async fn get_course(store: &dyn DocumentStore, id: Uuid) -> Result<Option<Course>, AppError> {
    get_record(store, Collection::Courses, id).await
}

pub async fn require_course(store: &dyn DocumentStore, id: Uuid) -> Result<Course, AppError> {
    require_record(store, Collection::Courses, id, "Course").await
}

pub async fn list_published(store: &dyn DocumentStore) -> Result<Vec<Course>, AppError> {
    list_records(
        store,
        Collection::Courses,
        &Filter::all().eq("is_published", true),
    )
    .await
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseQuery {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    pub category_id: Option<Uuid>,
}

pub async fn list_courses(
    store: &dyn DocumentStore,
    query: &CourseQuery,
) -> Result<Vec<Course>, AppError> {
    let filter = match query.category_id {
        Some(category_id) => Filter::all().eq_id("category_id", category_id),
        None => Filter::all(),
    };
    let courses: Vec<Course> = list_records(store, Collection::Courses, &filter).await?;
    let needle = query
        .title
        .as_deref()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());
    Ok(match needle {
        Some(needle) => courses
            .into_iter()
            .filter(|c| c.title.to_lowercase().contains(&needle))
            .collect(),
        None => courses,
    })
}

/// Published courses the given student type may see.
pub async fn list_for_student(
    store: &dyn DocumentStore,
    student_type: Option<&str>,
) -> Result<Vec<Course>, AppError> {
    Ok(list_published(store)
        .await?
        .into_iter()
        .filter(|c| c.is_visible_to(student_type))
        .collect())
}

pub async fn update_course(
    store: &dyn DocumentStore,
    id: Uuid,
    patch: &CoursePatch,
) -> Result<Course, AppError> {
    if patch.title.as_deref().map(|t| t.trim().is_empty()).unwrap_or(false) {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    if patch.price.map(|p| p < 0.0 || !p.is_finite()).unwrap_or(false) {
        return Err(AppError::Validation("price must be a non-negative number".into()));
    }
    require_course(store, id).await?;
    patch_record(store, Collection::Courses, id, patch).await
}

pub async fn set_published(
    store: &dyn DocumentStore,
    id: Uuid,
    is_published: bool,
) -> Result<Course, AppError> {
    let course = update_course(
        store,
        id,
        &CoursePatch {
            is_published: Some(is_published),
            ..Default::default()
        },
    )
    .await?;
    info!("Course {id} published: {is_published}");
    Ok(course)
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct CourseDeletion {
    pub course_id: Uuid,
    pub chapters: usize,
    pub progress_records: usize,
    pub attachments: usize,
    pub enrollments: usize,
}

/// Deletes a course after its chapters (each with its progress records),
/// attachments and enrollments. Sequential independent deletes; no rollback.
pub async fn delete_course(store: &dyn DocumentStore, id: Uuid) -> Result<CourseDeletion, AppError> {
    require_course(store, id).await?;
    let mut deletion = CourseDeletion {
        course_id: id,
        ..Default::default()
    };

    for chapter in list_by_course(store, id).await? {
        let removed = delete_chapter(store, chapter.id).await?;
        deletion.chapters += 1;
        deletion.progress_records += removed.progress_records;
    }

    let by_course = Filter::all().eq_id("course_id", id);
    deletion.attachments = delete_where(store, Collection::Attachments, &by_course).await?;
    deletion.enrollments = delete_where(store, Collection::Enrollments, &by_course).await?;

    store.delete(Collection::Courses, id).await?;
    info!(
        "Deleted course {id} ({} chapters, {} progress records)",
        deletion.chapters, deletion.progress_records
    );
    Ok(deletion)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::chapters::create_chapter;
    use crate::models::chapter::NewChapter;
    use crate::store::MemoryDocumentStore;

    pub(crate) async fn seed_course(store: &dyn DocumentStore, title: &str) -> Course {
        create_course(
            store,
            &NewCourse {
                title: title.to_string(),
                description: None,
                image_url: None,
                category_id: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_new_course_is_unpublished() {
        let store = MemoryDocumentStore::new();
        let course = seed_course(&store, "Rust 101").await;
        assert!(!course.is_published);
        assert!(list_published(&store).await.unwrap().is_empty());

        set_published(&store, course.id, true).await.unwrap();
        assert_eq!(list_published(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let store = MemoryDocumentStore::new();
        let err = create_course(
            &store,
            &NewCourse {
                title: "  ".into(),
                description: None,
                image_url: None,
                category_id: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let store = MemoryDocumentStore::new();
        let course = seed_course(&store, "Rust 101").await;
        let updated = update_course(
            &store,
            course.id,
            &CoursePatch {
                price: Some(49.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "Rust 101");
        assert_eq!(updated.price, Some(49.0));

        let bad = update_course(
            &store,
            course.id,
            &CoursePatch {
                price: Some(-1.0),
                ..Default::default()
            },
        )
        .await;
        assert!(bad.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_course() {
        let store = MemoryDocumentStore::new();
        let err = update_course(&store, Uuid::new_v4(), &CoursePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_courses_filters() {
        let store = MemoryDocumentStore::new();
        let cat = Uuid::new_v4();
        let a = seed_course(&store, "Intro to React").await;
        seed_course(&store, "Advanced React").await;
        seed_course(&store, "Postgres").await;
        update_course(
            &store,
            a.id,
            &CoursePatch {
                category_id: Some(cat),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let react = list_courses(
            &store,
            &CourseQuery {
                title: Some("react".into()),
                category_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(react.len(), 2);

        let in_cat = list_courses(
            &store,
            &CourseQuery {
                title: Some("REACT".into()),
                category_id: Some(cat),
            },
        )
        .await
        .unwrap();
        assert_eq!(in_cat.len(), 1);
        assert_eq!(in_cat[0].id, a.id);

        assert_eq!(list_courses(&store, &CourseQuery::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_student_visibility() {
        let store = MemoryDocumentStore::new();
        let open = seed_course(&store, "Open").await;
        let it_only = seed_course(&store, "IT only").await;
        seed_course(&store, "Draft").await;
        set_published(&store, open.id, true).await.unwrap();
        update_course(
            &store,
            it_only.id,
            &CoursePatch {
                is_published: Some(true),
                target_student_types: Some(vec!["IT".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(list_for_student(&store, Some("IT")).await.unwrap().len(), 2);
        assert_eq!(list_for_student(&store, Some("External")).await.unwrap().len(), 1);
        assert_eq!(list_for_student(&store, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_course_cascades() {
        let store = MemoryDocumentStore::new();
        let course = seed_course(&store, "Doomed").await;
        let keep = seed_course(&store, "Kept").await;
        let mut chapter_ids = Vec::new();
        for (pos, course_id) in [(1, course.id), (2, course.id), (1, keep.id)] {
            let ch = create_chapter(
                &store,
                &NewChapter {
                    course_id,
                    title: format!("ch{pos}"),
                    description: None,
                    video_url: None,
                    position: pos,
                },
            )
            .await
            .unwrap();
            chapter_ids.push(ch.id);
        }
        for ch in &chapter_ids {
            store
                .insert(
                    Collection::UserProgress,
                    json!({"chapter_id": ch.to_string(), "user_id": Uuid::new_v4().to_string()}),
                )
                .await
                .unwrap();
        }
        store
            .insert(Collection::Attachments, json!({"course_id": course.id.to_string()}))
            .await
            .unwrap();
        store
            .insert(Collection::Enrollments, json!({"course_id": course.id.to_string()}))
            .await
            .unwrap();

        let deletion = delete_course(&store, course.id).await.unwrap();
        assert_eq!(
            deletion,
            CourseDeletion {
                course_id: course.id,
                chapters: 2,
                progress_records: 2,
                attachments: 1,
                enrollments: 1,
            }
        );
        assert!(get_course(&store, course.id).await.unwrap().is_none());
        assert_eq!(list_by_course(&store, keep.id).await.unwrap().len(), 1);
        assert_eq!(
            store
                .list(Collection::UserProgress, &Filter::all())
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
