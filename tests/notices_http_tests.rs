//! HTTP tests for the notice board

mod support;

use axum::http::StatusCode;
use eduverse::prelude::*;
use serde_json::{Value, json};
use support::*;

async fn post_notice(school: &School, author: Uuid, body: Value) -> Value {
    let (header, value) = as_user(author);
    let response = school
        .server
        .post("/notices")
        .add_header(header, value)
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn board(school: &School, viewer: Uuid) -> Vec<Value> {
    let (header, value) = as_user(viewer);
    let response = school.server.get("/notices").add_header(header, value).await;
    response.assert_status_ok();
    response.json()
}

fn notice(title: &str, audience: &str) -> Value {
    json!({
        "title": title,
        "content": format!("{} details", title),
        "audience": audience,
        "priority": "Medium"
    })
}

// =============================================================================
// Publishing Tests
// =============================================================================

mod publish_tests {
    use super::*;

    #[tokio::test]
    async fn test_teacher_publishes_notice() {
        let school = create_test_server().await;

        let body = post_notice(&school, school.teacher, notice("Field trip", "Everyone")).await;
        assert_eq!(body["title"], "Field trip");
        assert_eq!(body["category"], "General");
        assert_eq!(body["isPinned"], false);
        assert_eq!(body["authorId"], school.teacher.to_string());
        assert_eq!(body["author"]["name"], "Sarah Johnson");
    }

    #[tokio::test]
    async fn test_missing_fields_are_listed() {
        let school = create_test_server().await;
        let (header, value) = as_user(school.admin);

        let response = school
            .server
            .post("/notices")
            .add_header(header, value)
            .json(&json!({ "title": "Untitled" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            "Please provide all required fields: content, audience, priority"
        );
    }

    #[tokio::test]
    async fn test_unknown_audience_is_rejected() {
        let school = create_test_server().await;
        let (header, value) = as_user(school.admin);

        let response = school
            .server
            .post("/notices")
            .add_header(header, value)
            .json(&notice("Secret", "Parents"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_student_cannot_publish() {
        let school = create_test_server().await;
        let (header, value) = as_user(school.student);

        let response = school
            .server
            .post("/notices")
            .add_header(header, value)
            .json(&notice("Party", "Everyone"))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}

// =============================================================================
// Board Visibility Tests
// =============================================================================

mod board_tests {
    use super::*;

    #[tokio::test]
    async fn test_audience_scoping() {
        let school = create_test_server().await;
        post_notice(&school, school.admin, notice("For all", "Everyone")).await;
        post_notice(&school, school.admin, notice("For students", "Students")).await;
        post_notice(&school, school.admin, notice("For teachers", "Teachers")).await;

        let titles = |notices: Vec<Value>| -> Vec<String> {
            let mut titles: Vec<String> = notices
                .iter()
                .map(|n| n["title"].as_str().unwrap().to_string())
                .collect();
            titles.sort();
            titles
        };

        assert_eq!(
            titles(board(&school, school.student).await),
            vec!["For all", "For students"]
        );
        assert_eq!(
            titles(board(&school, school.teacher).await),
            vec!["For all", "For teachers"]
        );
        assert_eq!(titles(board(&school, school.staff).await), vec!["For all"]);
        assert_eq!(board(&school, school.admin).await.len(), 3);
    }

    #[tokio::test]
    async fn test_pinned_notices_come_first() {
        let school = create_test_server().await;
        let mut pinned = notice("Pinned", "Everyone");
        pinned["isPinned"] = json!(true);
        post_notice(&school, school.admin, pinned).await;
        post_notice(&school, school.admin, notice("Newer", "Everyone")).await;

        let notices = board(&school, school.staff).await;
        assert_eq!(notices[0]["title"], "Pinned");
        assert_eq!(notices[1]["title"], "Newer");
    }

    #[tokio::test]
    async fn test_anonymous_cannot_read_board() {
        let school = create_test_server().await;
        school
            .server
            .get("/notices")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

// =============================================================================
// Editing Tests
// =============================================================================

mod edit_tests {
    use super::*;

    #[tokio::test]
    async fn test_author_updates_notice() {
        let school = create_test_server().await;
        let created = post_notice(&school, school.teacher, notice("Exam", "Everyone")).await;
        let id = created["id"].as_str().unwrap();

        let (header, value) = as_user(school.teacher);
        let response = school
            .server
            .put(&format!("/notices/{}", id))
            .add_header(header, value)
            .json(&json!({ "priority": "High", "isPinned": true }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["priority"], "High");
        assert_eq!(body["isPinned"], true);
        assert_eq!(body["title"], "Exam");
    }

    #[tokio::test]
    async fn test_other_teacher_cannot_edit() {
        let school = create_test_server().await;
        let other_teacher = add_user(&school.state, "Ian Clark", "ian@school.edu", Role::Teacher).await;
        let created = post_notice(&school, school.teacher, notice("Exam", "Everyone")).await;
        let id = created["id"].as_str().unwrap();

        let (header, value) = as_user(other_teacher);
        let response = school
            .server
            .put(&format!("/notices/{}", id))
            .add_header(header, value)
            .json(&json!({ "title": "Cancelled" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let (header, value) = as_user(other_teacher);
        let response = school
            .server
            .delete(&format!("/notices/{}", id))
            .add_header(header, value)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_moderates_and_deletes() {
        let school = create_test_server().await;
        let created = post_notice(&school, school.teacher, notice("Exam", "Everyone")).await;
        let id = created["id"].as_str().unwrap();

        let (header, value) = as_user(school.admin);
        let response = school
            .server
            .delete(&format!("/notices/{}", id))
            .add_header(header, value)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Notice removed");

        assert!(board(&school, school.admin).await.is_empty());

        let (header, value) = as_user(school.admin);
        let response = school
            .server
            .delete(&format!("/notices/{}", id))
            .add_header(header, value)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_publishes_event() {
        let school = create_test_server().await;
        let mut events = school.state.event_bus.as_ref().unwrap().subscribe();
        let created = post_notice(&school, school.admin, notice("Holiday", "Everyone")).await;
        let id = created["id"].as_str().unwrap();

        let (header, value) = as_user(school.admin);
        school
            .server
            .put(&format!("/notices/{}", id))
            .add_header(header, value)
            .json(&json!({ "content": "School closed Friday" }))
            .await
            .assert_status_ok();

        assert_eq!(events.recv().await.unwrap().event.name(), "notice_published");
        assert_eq!(events.recv().await.unwrap().event.name(), "notice_updated");
    }
}
