//! Adapter interfaces for the course service.
//!
//! `CourseApi` is the read/enroll surface the core components consume;
//! `ApiClient` implements it over HTTP and additionally exposes the auth
//! and administrative endpoints as inherent methods.

pub mod http;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Chapter, ChapterId, Course, CourseId};

// Re-export the HTTP client
pub use http::{ApiClient, ChapterInput, ContentInput, CourseInput};

/// Errors returned by the course service or the transport underneath it
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("{context}: {message}")]
    Decode { context: String, message: String },
}

impl ApiError {
    /// Build a status error (also handy for fakes)
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status, when the service answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode { .. } => None,
        }
    }

    /// Effective error text, as a user would see it
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Uniform response envelope: `{success, message, data}` on success and
/// `{success, message, error}` on failure
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// `error` if present, else `message`, else the caller's fallback
    pub fn error_text(&self, fallback: &str) -> String {
        effective_text(self.error.as_deref(), Some(&self.message), fallback)
    }
}

/// Resolve the user-visible failure text from a raw error body.
///
/// Bodies that are not JSON envelopes yield the fallback.
pub fn failure_text(body: &str, fallback: &str) -> String {
    match serde_json::from_str::<Envelope<serde_json::Value>>(body) {
        Ok(envelope) => envelope.error_text(fallback),
        Err(_) => fallback.to_string(),
    }
}

fn effective_text(error: Option<&str>, message: Option<&str>, fallback: &str) -> String {
    [error, message]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Read/enroll operations the core components depend on
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// `GET /api/courses`
    async fn list_courses(&self, token: Option<&str>) -> Result<Vec<Course>, ApiError>;

    /// `GET /api/courses/{id}`
    async fn get_course(&self, id: CourseId, token: Option<&str>) -> Result<Course, ApiError>;

    /// `GET /api/chapters?course_id=`
    async fn list_chapters(
        &self,
        course_id: CourseId,
        token: Option<&str>,
    ) -> Result<Vec<Chapter>, ApiError>;

    /// `GET /api/chapters/{id}/contents`: the chapter with its contents nested
    async fn chapter_contents(
        &self,
        chapter_id: ChapterId,
        token: Option<&str>,
    ) -> Result<Chapter, ApiError>;

    /// `POST /api/enrollments`
    async fn enroll(&self, course_id: CourseId, token: &str) -> Result<(), ApiError>;

    /// `GET /api/enrollments/my`
    async fn my_enrollments(&self, token: &str) -> Result<Vec<CourseId>, ApiError>;
}
