pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::assessment::handlers as assessment;
use crate::catalog::handlers as catalog;
use crate::learning::handlers as learning;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users
        .route("/api/v1/users", get(accounts::handle_list_users))
        .route("/api/v1/users/sync", post(accounts::handle_sync_profile))
        .route(
            "/api/v1/users/me",
            get(accounts::handle_me).patch(accounts::handle_update_profile),
        )
        .route("/api/v1/users/me/profile", get(accounts::handle_safe_profile))
        .route(
            "/api/v1/users/by-email/:email",
            get(accounts::handle_get_by_email),
        )
        .route(
            "/api/v1/users/:id",
            get(accounts::handle_get_user).delete(accounts::handle_delete_user),
        )
        .route("/api/v1/users/:id/role", put(accounts::handle_update_role))
        .route(
            "/api/v1/users/:id/verification",
            post(accounts::handle_issue_verification),
        )
        .route(
            "/api/v1/verification/redeem",
            post(accounts::handle_redeem_verification),
        )
        // Onboarding and route guards
        .route("/api/v1/onboarding", get(accounts::handle_onboarding_status))
        .route(
            "/api/v1/onboarding/profile",
            post(accounts::handle_onboarding_profile),
        )
        .route(
            "/api/v1/onboarding/student",
            post(accounts::handle_onboarding_student),
        )
        .route(
            "/api/v1/onboarding/instructor",
            post(accounts::handle_onboarding_instructor),
        )
        .route(
            "/api/v1/onboarding/record",
            get(accounts::handle_onboarding_record),
        )
        .route("/api/v1/access/:area", get(accounts::handle_access))
        // Assessment
        .route(
            "/api/v1/assessment",
            get(assessment::handle_catalogue).post(assessment::handle_submit),
        )
        .route(
            "/api/v1/assessment/latest",
            get(assessment::handle_latest).delete(assessment::handle_delete_latest),
        )
        .route("/api/v1/assessment/history", get(assessment::handle_history))
        // Courses
        .route(
            "/api/v1/courses",
            get(catalog::handle_list_published).post(catalog::handle_create_course),
        )
        .route("/api/v1/courses/manage", get(catalog::handle_list_all_courses))
        .route("/api/v1/courses/mine", get(catalog::handle_list_for_student))
        .route(
            "/api/v1/courses/:id",
            get(catalog::handle_get_course)
                .patch(catalog::handle_update_course)
                .delete(catalog::handle_delete_course),
        )
        .route(
            "/api/v1/courses/:id/publish",
            post(catalog::handle_publish_course),
        )
        .route(
            "/api/v1/courses/:id/unpublish",
            post(catalog::handle_unpublish_course),
        )
        .route(
            "/api/v1/courses/:id/chapters",
            get(catalog::handle_list_published_chapters).post(catalog::handle_create_chapter),
        )
        .route(
            "/api/v1/courses/:id/chapters/all",
            get(catalog::handle_list_all_chapters),
        )
        .route(
            "/api/v1/courses/:id/attachments",
            get(catalog::handle_list_attachments).post(catalog::handle_create_attachment),
        )
        .route("/api/v1/courses/:id/enroll", post(learning::handle_enroll))
        .route(
            "/api/v1/courses/:id/enrollments",
            get(learning::handle_course_enrollments),
        )
        .route(
            "/api/v1/courses/:id/progress",
            get(learning::handle_course_progress),
        )
        // Chapters
        .route(
            "/api/v1/chapters/:id",
            get(catalog::handle_get_chapter)
                .patch(catalog::handle_update_chapter)
                .delete(catalog::handle_delete_chapter),
        )
        .route(
            "/api/v1/chapters/:id/publish",
            post(catalog::handle_publish_chapter),
        )
        .route(
            "/api/v1/chapters/:id/complete",
            post(learning::handle_complete_chapter),
        )
        .route(
            "/api/v1/chapters/:id/progress",
            get(learning::handle_chapter_progress),
        )
        .route(
            "/api/v1/attachments/:id",
            delete(catalog::handle_delete_attachment),
        )
        // Categories
        .route(
            "/api/v1/categories",
            get(catalog::handle_list_categories).post(catalog::handle_create_category),
        )
        .route(
            "/api/v1/categories/by-name/:name",
            get(catalog::handle_get_category_by_name),
        )
        .route(
            "/api/v1/categories/:id",
            get(catalog::handle_get_category)
                .patch(catalog::handle_rename_category)
                .delete(catalog::handle_delete_category),
        )
        .route(
            "/api/v1/student-categories",
            get(catalog::handle_list_student_categories)
                .post(catalog::handle_create_student_category),
        )
        .route(
            "/api/v1/student-categories/by-name/:name",
            get(catalog::handle_get_student_category_by_name),
        )
        .route(
            "/api/v1/student-categories/:id",
            get(catalog::handle_get_student_category)
                .patch(catalog::handle_update_student_category)
                .delete(catalog::handle_delete_student_category),
        )
        // Learning
        .route("/api/v1/enrollments/mine", get(learning::handle_my_enrollments))
        .route(
            "/api/v1/enrollments/:id",
            delete(learning::handle_delete_enrollment),
        )
        .route("/api/v1/progress/mine", get(learning::handle_my_progress))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::accounts::identity::AUTH_USER_HEADER;
    use crate::accounts::users::tests::seed_user;
    use crate::models::user::Role;

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(AUTH_USER_HEADER, auth);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(AppState::for_tests());
        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "lms-api");
    }

    #[tokio::test]
    async fn test_access_decisions() {
        let state = AppState::for_tests();
        seed_user(state.store.as_ref(), "student_1", Role::Student).await;
        let app = build_router(state);

        let (status, body) = call(&app, "GET", "/api/v1/access/dashboard", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"decision": "redirect", "location": "/"}));

        let (_, body) = call(
            &app,
            "GET",
            "/api/v1/access/student_console",
            Some("student_1"),
            None,
        )
        .await;
        assert_eq!(body, json!({"decision": "redirect", "location": "/verify-id"}));

        let (_, body) = call(&app, "GET", "/api/v1/access/assessment", Some("student_1"), None).await;
        assert_eq!(body, json!({"decision": "allow"}));
    }

    #[tokio::test]
    async fn test_identity_required() {
        let app = build_router(AppState::for_tests());
        let (status, body) = call(&app, "GET", "/api/v1/users/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        // A known identity with no record yet is also 401 until synced.
        let (status, _) = call(&app, "GET", "/api/v1/users/me", Some("new_user"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/users/sync",
            Some("new_user"),
            Some(json!({"email": "new@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "student");

        let (status, body) = call(&app, "GET", "/api/v1/users/me/profile", Some("new_user"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "new@example.com");
        assert!(body.get("verification_id").is_none());
    }

    #[tokio::test]
    async fn test_assessment_submit_and_retake() {
        let state = AppState::for_tests();
        seed_user(state.store.as_ref(), "student_1", Role::Student).await;
        let app = build_router(state);

        let (status, body) = call(&app, "GET", "/api/v1/assessment", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 10);
        assert_eq!(body["paths"].as_array().unwrap().len(), 5);
        assert!(body["questions"][0].get("points").is_none());

        let all_first: Value = (1..=10).map(|id| (id.to_string(), json!(0))).collect::<serde_json::Map<_, _>>().into();
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/assessment",
            Some("student_1"),
            Some(json!({ "answers": all_first })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "created");
        assert_eq!(body["assessment"]["recommended_path"], "frontend");
        assert_eq!(body["assessment"]["path_scores"]["frontend"], 27);

        let mut by_text = serde_json::Map::new();
        for id in 1..=10 {
            by_text.insert(id.to_string(), json!(3));
        }
        by_text.insert(
            "1".into(),
            json!("Working with data, patterns, and AI/ML"),
        );
        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/assessment",
            Some("student_1"),
            Some(json!({ "answers": by_text })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "updated");
        assert_eq!(body["assessment"]["recommended_path"], "data_science");

        let (_, history) = call(&app, "GET", "/api/v1/assessment/history", Some("student_1"), None).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_incomplete_assessment_is_400() {
        let state = AppState::for_tests();
        seed_user(state.store.as_ref(), "student_1", Role::Student).await;
        let app = build_router(state);

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/assessment",
            Some("student_1"),
            Some(json!({ "answers": { "1": 0 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_catalog_mutations_need_permission() {
        let state = AppState::for_tests();
        seed_user(state.store.as_ref(), "student_1", Role::Student).await;
        seed_user(state.store.as_ref(), "instructor_1", Role::Instructor).await;
        let app = build_router(state);

        let course = json!({"title": "Rust for the Web", "description": null, "image_url": null, "category_id": null});
        let (status, _) = call(&app, "POST", "/api/v1/courses", Some("student_1"), Some(course.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, created) = call(&app, "POST", "/api/v1/courses", Some("instructor_1"), Some(course)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        // Drafts are not listed publicly.
        let (_, listed) = call(&app, "GET", "/api/v1/courses", None, None).await;
        assert_eq!(listed, json!([]));

        let (status, _) = call(&app, "POST", &format!("/api/v1/courses/{id}/publish"), Some("instructor_1"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "POST", &format!("/api/v1/courses/{id}/enroll"), Some("student_1"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = call(&app, "POST", &format!("/api/v1/courses/{id}/enroll"), Some("student_1"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, deleted) = call(&app, "DELETE", &format!("/api/v1/courses/{id}"), Some("instructor_1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["enrollments"], 1);

        let (status, _) = call(&app, "GET", &format!("/api/v1/courses/{id}"), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_verification_issue_and_redeem() {
        let state = AppState::for_tests();
        seed_user(state.store.as_ref(), "admin_1", Role::Admin).await;
        let student = seed_user(state.store.as_ref(), "student_1", Role::Student).await;
        let app = build_router(state);

        let uri = format!("/api/v1/users/{}/verification", student.id);
        let (status, _) = call(&app, "POST", &uri, Some("student_1"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, issued) = call(&app, "POST", &uri, Some("admin_1"), None).await;
        assert_eq!(status, StatusCode::OK);
        let id = issued["verification_id"].as_str().unwrap().to_string();
        assert!(id.ends_with("/keek01"));
        assert_eq!(issued["delivery"]["message_id"], Value::Null);

        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/verification/redeem",
            Some("student_1"),
            Some(json!({"verification_id": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, profile) = call(
            &app,
            "POST",
            "/api/v1/verification/redeem",
            Some("student_1"),
            Some(json!({"verification_id": format!(" {id} ")})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["verification_id_used"], true);

        let (_, decision) = call(&app, "GET", "/api/v1/access/dashboard", Some("student_1"), None).await;
        assert_eq!(
            decision,
            json!({"decision": "redirect", "location": "/student-onboarding"})
        );
    }

    #[tokio::test]
    async fn test_student_cannot_read_own_verification_id() {
        let state = AppState::for_tests();
        seed_user(state.store.as_ref(), "admin_1", Role::Admin).await;
        let student = seed_user(state.store.as_ref(), "student_1", Role::Student).await;
        let app = build_router(state);

        let uri = format!("/api/v1/users/{}/verification", student.id);
        let (_, issued) = call(&app, "POST", &uri, Some("admin_1"), None).await;
        let id = issued["verification_id"].as_str().unwrap().to_string();

        let own = format!("/api/v1/users/{}", student.id);
        for path in ["/api/v1/users/me", own.as_str()] {
            let (status, body) = call(&app, "GET", path, Some("student_1"), None).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.get("verification_id").is_none(), "{path} exposed the id");
            assert!(!body.to_string().contains(&id));
        }

        let (_, body) = call(
            &app,
            "PATCH",
            "/api/v1/users/me",
            Some("student_1"),
            Some(json!({"learning_goals": "ship a web app"})),
        )
        .await;
        assert!(body.get("verification_id").is_none());

        let (_, body) = call(&app, "GET", &own, Some("admin_1"), None).await;
        assert_eq!(body["verification_id"], json!(id));
    }

    #[tokio::test]
    async fn test_drafts_hidden_from_single_reads() {
        let state = AppState::for_tests();
        seed_user(state.store.as_ref(), "student_1", Role::Student).await;
        seed_user(state.store.as_ref(), "instructor_1", Role::Instructor).await;
        let app = build_router(state);

        let course = json!({"title": "Draft Course", "description": null, "image_url": null, "category_id": null});
        let (_, created) = call(&app, "POST", "/api/v1/courses", Some("instructor_1"), Some(course)).await;
        let course_id = created["id"].as_str().unwrap().to_string();
        let (status, chapter) = call(
            &app,
            "POST",
            &format!("/api/v1/courses/{course_id}/chapters"),
            Some("instructor_1"),
            Some(json!({"title": "Intro"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let chapter_id = chapter["id"].as_str().unwrap().to_string();

        let course_uri = format!("/api/v1/courses/{course_id}");
        let chapter_uri = format!("/api/v1/chapters/{chapter_id}");
        for uri in [&course_uri, &chapter_uri] {
            let (status, _) = call(&app, "GET", uri, None, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            let (status, _) = call(&app, "GET", uri, Some("student_1"), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            let (status, _) = call(&app, "GET", uri, Some("instructor_1"), None).await;
            assert_eq!(status, StatusCode::OK);
        }

        call(&app, "POST", &format!("{course_uri}/publish"), Some("instructor_1"), None).await;
        call(&app, "POST", &format!("{chapter_uri}/publish"), Some("instructor_1"), None).await;
        for uri in [&course_uri, &chapter_uri] {
            let (status, _) = call(&app, "GET", uri, None, None).await;
            assert_eq!(status, StatusCode::OK);
        }
    }
}
