//! HTTP Client Integration Tests
//!
//! Wire format of the course service client against a mock server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lectern::adapters::{ApiClient, ApiError, ContentInput, CourseApi};
use lectern::domain::{ChapterId, CourseId, LoginRequest, MediaKind};

const TOKEN: &str = "access-abc";

fn course_json(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "created_at": "2024-03-01T09:00:00Z",
        "updated_at": "2024-03-02T09:00:00Z"
    })
}

#[tokio::test]
async fn test_list_courses_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(header("authorization", "Bearer access-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Courses retrieved",
            "data": {
                "courses": [course_json(7, "Intro to Networks")],
                "total": 1,
                "page": 1
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let courses = client.list_courses(Some(TOKEN)).await.unwrap();

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, CourseId(7));
    assert_eq!(courses[0].name, "Intro to Networks");
}

#[tokio::test]
async fn test_list_chapters_by_course() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chapters"))
        .and(query_param("course_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {
                "chapters": [
                    {"id": 10, "course_id": 7, "title": "Routing", "chapter_order": 2, "is_published": true},
                    {"id": 5, "course_id": 7, "title": "Basics", "chapter_order": 1, "is_published": false}
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let chapters = client.list_chapters(CourseId(7), Some(TOKEN)).await.unwrap();

    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[1].order, 1);
    assert!(!chapters[1].published);
    assert!(!chapters[0].is_loaded());
}

#[tokio::test]
async fn test_chapter_contents_nested() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chapters/5/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {
                "id": 5,
                "course_id": 7,
                "title": "Basics",
                "chapter_order": 1,
                "contents": [{
                    "id": 1,
                    "chapter_id": 5,
                    "title": "Welcome",
                    "content_type": "video",
                    "file_url": "https://youtu.be/dQw4w9WgXcQ",
                    "content_order": 1,
                    "is_published": true,
                    "duration_minutes": 4
                }]
            }
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let chapter = client
        .chapter_contents(ChapterId(5), Some(TOKEN))
        .await
        .unwrap();

    let contents = chapter.contents.unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].kind, MediaKind::Video);
    assert_eq!(contents[0].duration_minutes, Some(4));
}

#[tokio::test]
async fn test_error_field_wins_over_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/enrollments/my"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Unauthorized",
            "error": "token is expired"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.my_enrollments(TOKEN).await.unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.message(), "token is expired");
}

#[tokio::test]
async fn test_non_json_failure_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.list_courses(Some(TOKEN)).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 502, .. }));
    assert_eq!(err.message(), "Failed to fetch courses");
}

#[tokio::test]
async fn test_enroll_body_and_enrollment_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/enrollments"))
        .and(header("authorization", "Bearer access-abc"))
        .and(body_json(json!({"course_id": 7})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Enrolled",
            "data": {"id": 1, "course_id": 7}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/enrollments/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {"course_ids": [3, 7]}
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    client.enroll(CourseId(7), TOKEN).await.unwrap();
    let ids = client.my_enrollments(TOKEN).await.unwrap();

    assert_eq!(ids, vec![CourseId(3), CourseId(7)]);
}

#[tokio::test]
async fn test_login_returns_tokens_and_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"nip": "1987654321", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "data": {
                "access_token": "access-abc",
                "refresh_token": "refresh-xyz",
                "user": {
                    "id": 42,
                    "name": "Rina Wijaya",
                    "email": "rina@example.com",
                    "role": "student",
                    "is_active": true
                }
            }
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let auth = client
        .login(&LoginRequest {
            nip: "1987654321".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(auth.access_token, "access-abc");
    assert_eq!(auth.user.role, "student");
}

#[tokio::test]
async fn test_create_content_omits_zero_duration() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contents"))
        .and(body_json(json!({
            "chapter_id": 5,
            "title": "Reading",
            "description": "",
            "content_type": "text",
            "file_url": "",
            "content_text": "Read chapter one.",
            "content_order": 3,
            "is_published": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Content created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input = ContentInput {
        chapter_id: Some(ChapterId(5)),
        title: "Reading".to_string(),
        description: String::new(),
        content_type: MediaKind::Text,
        file_url: String::new(),
        content_text: "Read chapter one.".to_string(),
        content_order: 3,
        is_published: true,
        duration_minutes: Some(0),
    }
    .normalized();

    let client = ApiClient::new(server.uri());
    client.create_content(&input, TOKEN).await.unwrap();
}
