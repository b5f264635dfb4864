//! Session Guard Integration Tests
//!
//! Credential gating, failure classification, and identity reset.

mod common;

use std::sync::Arc;

use common::{Endpoint, FakeApi, Harness, TOKEN};
use lectern::adapters::ApiClient;
use lectern::core::{ContentTree, CourseView};
use lectern::domain::CourseId;
use lectern::session::{
    ActionError, ClassifyPolicy, FileStorage, Route, SessionGuard, SessionStore, Storage,
    ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY,
};
use lectern::ApiError;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_expired_text_clears_identity_only() {
    for message in ["Token expired", "TOKEN EXPIRED", "token has Expired"] {
        let harness = Harness::signed_in();
        harness.storage.set("theme", "dark").unwrap();

        let err = harness.guard.intercept(ApiError::status(500, message));

        assert_eq!(err, ActionError::SessionReset, "message: {}", message);
        assert_eq!(harness.storage.keys(), vec!["theme".to_string()]);
        assert_eq!(harness.navigator.routes(), vec![Route::Login]);
    }
}

#[test]
fn test_auth_status_resets_without_heuristic() {
    for status in [401, 403] {
        let harness = Harness::signed_in();
        let guard = harness
            .guard
            .clone()
            .with_policy(ClassifyPolicy {
                text_heuristic: false,
            });

        let err = guard.intercept(ApiError::status(status, "Forbidden"));

        assert_eq!(err, ActionError::SessionReset);
        assert!(harness.storage.keys().is_empty());
    }
}

/// A validation message mentioning "invalid" logs the user out unless the
/// text heuristic is turned off.
#[test]
fn test_validation_error_heuristic_risk() {
    let harness = Harness::signed_in();
    let err = harness
        .guard
        .intercept(ApiError::status(422, "Invalid email format"));
    assert_eq!(err, ActionError::SessionReset);
    assert!(harness.storage.get(ACCESS_TOKEN_KEY).unwrap().is_none());

    let harness = Harness::signed_in();
    let guard = harness.guard.clone().with_policy(ClassifyPolicy {
        text_heuristic: false,
    });
    let err = guard.intercept(ApiError::status(422, "Invalid email format"));
    assert_eq!(err, ActionError::Failed("Invalid email format".to_string()));
    assert_eq!(
        harness.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
        Some(TOKEN)
    );
    assert!(harness.navigator.routes().is_empty());
}

#[test]
fn test_ordinary_failure_is_surfaced() {
    let harness = Harness::signed_in();

    let err = harness
        .guard
        .intercept(ApiError::status(500, "Failed to fetch courses"));

    assert_eq!(err, ActionError::Failed("Failed to fetch courses".to_string()));
    assert_eq!(harness.storage.keys().len(), 3);
    assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_missing_credential_redirects_before_request() {
    let api = FakeApi::new();
    let harness = Harness::signed_out();

    let err = ContentTree::load(&api, &harness.guard, CourseId(7))
        .await
        .unwrap_err();

    assert_eq!(err, ActionError::SessionReset);
    assert_eq!(api.total_calls(), 0);
    assert_eq!(harness.navigator.last(), Some(Route::Login));
}

#[tokio::test]
async fn test_credential_is_sent_as_stored() {
    let api = FakeApi::new();
    let harness = Harness::signed_in();

    ContentTree::load(&api, &harness.guard, CourseId(7))
        .await
        .unwrap();

    assert_eq!(api.calls(Endpoint::ListChapters), 1);
    assert_eq!(api.tokens_seen(), vec![TOKEN.to_string()]);
}

#[test]
fn test_logout_clears_and_goes_home() {
    let harness = Harness::signed_in();

    harness.guard.logout().unwrap();

    assert!(harness.guard.store().load().unwrap().is_none());
    assert_eq!(harness.navigator.routes(), vec![Route::Home]);
}

#[test]
fn test_require_user_treats_null_profile_as_missing() {
    for raw in ["null", "undefined", "{not json"] {
        let harness = Harness::signed_in();
        harness.storage.set(USER_KEY, raw).unwrap();

        let err = harness.guard.require_user().unwrap_err();

        assert_eq!(err, ActionError::SessionReset);
        assert_eq!(harness.navigator.last(), Some(Route::Login));
    }
}

#[test]
fn test_file_backed_session_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state").join("session.json");
    let harness = Harness::signed_in();
    let session = harness.guard.store().load().unwrap().unwrap();

    let storage = Arc::new(FileStorage::new(&path));
    storage.set(ACCESS_TOKEN_KEY, &session.access_token).unwrap();
    storage
        .set(REFRESH_TOKEN_KEY, session.refresh_token.as_deref().unwrap())
        .unwrap();
    storage
        .set(USER_KEY, &serde_json::to_string(&session.user).unwrap())
        .unwrap();

    let reopened = SessionStore::new(Arc::new(FileStorage::new(&path)));
    let loaded = reopened.load().unwrap().unwrap();
    assert_eq!(loaded, session);

    let navigator = Arc::new(common::RecordingNavigator::default());
    let guard = SessionGuard::new(reopened, navigator.clone());
    guard.intercept(ApiError::status(401, "Unauthorized"));
    assert!(guard.store().load().unwrap().is_none());
    assert!(path.exists());
}

#[tokio::test]
async fn test_undecodable_success_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {
                "id": 7,
                "name": "Intro to Networks",
                "description": null,
                "created_at": "not a timestamp",
                "updated_at": null
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chapters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {"chapters": []}
        })))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let harness = Harness::signed_in();

    let err = CourseView::open(&api, &harness.guard, CourseId(7))
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::Failed(_)), "got {:?}", err);
    assert_eq!(
        harness.storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(),
        Some(TOKEN)
    );
    assert!(harness.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_null_course_description_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/courses/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {
                "id": 7,
                "name": "Intro to Networks",
                "description": null,
                "created_at": "2024-03-01T09:00:00Z",
                "updated_at": "2024-03-01T09:00:00Z"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/chapters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {"chapters": []}
        })))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let harness = Harness::signed_in();

    let view = CourseView::open(&api, &harness.guard, CourseId(7))
        .await
        .unwrap();

    assert_eq!(view.course().description, "");
    assert!(view.tree().chapters().is_empty());
    assert!(harness.navigator.routes().is_empty());
}
