//! HTTP client for the course service REST API.
//!
//! Every response is wrapped in the service envelope; failures carry the
//! envelope's `error`/`message` text. Authenticated calls send
//! `Authorization: Bearer <access_token>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{failure_text, ApiError, CourseApi, Envelope};
use crate::domain::{
    AuthResponse, Chapter, ChapterId, Content, ContentId, Course, CourseId, LoginRequest,
    MediaKind, RegisterRequest,
};

/// Course service client
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Service root, without a trailing slash
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

/// `data` of `GET /api/courses`
#[derive(Debug, Default, Deserialize)]
struct CoursePage {
    #[serde(default)]
    courses: Vec<Course>,
}

/// `data` of `GET /api/chapters?course_id=`
#[derive(Debug, Default, Deserialize)]
struct ChapterList {
    #[serde(default)]
    chapters: Vec<Chapter>,
}

/// `data` of `GET /api/contents?chapter_id=`
#[derive(Debug, Default, Deserialize)]
struct ContentList {
    #[serde(default)]
    contents: Vec<Content>,
}

/// `data` of `GET /api/enrollments/my`
#[derive(Debug, Default, Deserialize)]
struct EnrollmentList {
    #[serde(default)]
    course_ids: Vec<CourseId>,
}

/// Course create/update payload
#[derive(Debug, Clone, Serialize)]
pub struct CourseInput {
    pub name: String,
    pub description: String,
}

/// Chapter create/update payload
#[derive(Debug, Clone, Serialize)]
pub struct ChapterInput {
    /// Required on create, omitted on update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<CourseId>,
    pub title: String,
    pub description: String,
    pub chapter_order: i32,
    pub is_published: bool,
}

/// Content create/update payload
#[derive(Debug, Clone, Serialize)]
pub struct ContentInput {
    /// Required on create, omitted on update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<ChapterId>,
    pub title: String,
    pub description: String,
    pub content_type: MediaKind,
    pub file_url: String,
    pub content_text: String,
    pub content_order: i32,
    pub is_published: bool,
    /// Only sent when positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

impl ContentInput {
    /// Drop a zero duration so the service treats it as unset
    pub fn normalized(mut self) -> Self {
        self.duration_minutes = self.duration_minutes.filter(|minutes| *minutes > 0);
        self
    }
}

#[derive(Serialize)]
struct EnrollRequest {
    course_id: CourseId,
}

impl ApiClient {
    /// Create a client with reqwest defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client with a per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Service root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.api_url(path))
            .header("Content-Type", "application/json");

        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and unwrap the envelope's `data`.
    ///
    /// `fallback` is the failure text used when the service gives none.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<Option<T>, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "Course service responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = failure_text(&body, fallback);
            warn!(status = status.as_u16(), %message, "Course service request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode {
                context: fallback.to_string(),
                message: e.to_string(),
            })?;

        Ok(envelope.data)
    }

    /// Like `send`, but the envelope must carry `data`
    async fn send_required<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.send(builder, fallback)
            .await?
            .ok_or_else(|| ApiError::Decode {
                context: fallback.to_string(),
                message: "response carried no data".to_string(),
            })
    }

    /// Send a mutation whose response payload is not needed
    async fn send_discard(&self, builder: RequestBuilder, fallback: &str) -> Result<(), ApiError> {
        self.send::<serde_json::Value>(builder, fallback).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// `POST /api/login`
    #[instrument(skip_all, fields(nip = %request.nip))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let builder = self.request(Method::POST, "login", None).json(request);
        self.send_required(builder, "Login failed").await
    }

    /// `POST /api/register`
    #[instrument(skip_all, fields(nip = %request.nip, role = %request.role))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let builder = self.request(Method::POST, "register", None).json(request);
        self.send_required(builder, "Registration failed").await
    }

    // ------------------------------------------------------------------
    // Administrative mutations (authorization is enforced server-side)
    // ------------------------------------------------------------------

    pub async fn create_course(&self, input: &CourseInput, token: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, "courses", Some(token)).json(input);
        self.send_discard(builder, "Failed to create course").await
    }

    pub async fn update_course(
        &self,
        id: CourseId,
        input: &CourseInput,
        token: &str,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PUT, &format!("courses/{}", id), Some(token))
            .json(input);
        self.send_discard(builder, "Failed to update course").await
    }

    pub async fn delete_course(&self, id: CourseId, token: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &format!("courses/{}", id), Some(token));
        self.send_discard(builder, "Failed to delete course").await
    }

    pub async fn create_chapter(&self, input: &ChapterInput, token: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, "chapters", Some(token)).json(input);
        self.send_discard(builder, "Failed to create chapter").await
    }

    pub async fn update_chapter(
        &self,
        id: ChapterId,
        input: &ChapterInput,
        token: &str,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PUT, &format!("chapters/{}", id), Some(token))
            .json(input);
        self.send_discard(builder, "Failed to update chapter").await
    }

    pub async fn delete_chapter(&self, id: ChapterId, token: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &format!("chapters/{}", id), Some(token));
        self.send_discard(builder, "Failed to delete chapter").await
    }

    /// `GET /api/contents?chapter_id=`
    pub async fn list_contents(
        &self,
        chapter_id: ChapterId,
        token: Option<&str>,
    ) -> Result<Vec<Content>, ApiError> {
        let builder = self
            .request(Method::GET, "contents", token)
            .query(&[("chapter_id", chapter_id.get())]);
        let list: Option<ContentList> = self.send(builder, "Failed to fetch contents").await?;
        Ok(list.unwrap_or_default().contents)
    }

    pub async fn create_content(&self, input: &ContentInput, token: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, "contents", Some(token)).json(input);
        self.send_discard(builder, "Failed to create content").await
    }

    pub async fn update_content(
        &self,
        id: ContentId,
        input: &ContentInput,
        token: &str,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PUT, &format!("contents/{}", id), Some(token))
            .json(input);
        self.send_discard(builder, "Failed to update content").await
    }

    pub async fn delete_content(&self, id: ContentId, token: &str) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, &format!("contents/{}", id), Some(token));
        self.send_discard(builder, "Failed to delete content").await
    }
}

#[async_trait]
impl CourseApi for ApiClient {
    async fn list_courses(&self, token: Option<&str>) -> Result<Vec<Course>, ApiError> {
        let builder = self.request(Method::GET, "courses", token);
        let page: Option<CoursePage> = self.send(builder, "Failed to fetch courses").await?;
        Ok(page.unwrap_or_default().courses)
    }

    async fn get_course(&self, id: CourseId, token: Option<&str>) -> Result<Course, ApiError> {
        let builder = self.request(Method::GET, &format!("courses/{}", id), token);
        self.send_required(builder, "Failed to fetch course").await
    }

    async fn list_chapters(
        &self,
        course_id: CourseId,
        token: Option<&str>,
    ) -> Result<Vec<Chapter>, ApiError> {
        let builder = self
            .request(Method::GET, "chapters", token)
            .query(&[("course_id", course_id.get())]);
        let list: Option<ChapterList> = self.send(builder, "Failed to fetch chapters").await?;
        Ok(list.unwrap_or_default().chapters)
    }

    async fn chapter_contents(
        &self,
        chapter_id: ChapterId,
        token: Option<&str>,
    ) -> Result<Chapter, ApiError> {
        let builder = self.request(Method::GET, &format!("chapters/{}/contents", chapter_id), token);
        self.send_required(builder, "Failed to fetch chapter contents")
            .await
    }

    async fn enroll(&self, course_id: CourseId, token: &str) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "enrollments", Some(token))
            .json(&EnrollRequest { course_id });
        self.send_discard(builder, "Failed to enroll in course").await
    }

    async fn my_enrollments(&self, token: &str) -> Result<Vec<CourseId>, ApiError> {
        let builder = self.request(Method::GET, "enrollments/my", Some(token));
        let list: Option<EnrollmentList> =
            self.send(builder, "Failed to fetch enrollments").await?;
        Ok(list.unwrap_or_default().course_ids)
    }
}
