//! Shared fixtures for integration tests.
//!
//! `FakeApi` answers from canned data and counts every call; individual
//! endpoints can be told to fail with a given status and message.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use lectern::adapters::{ApiError, CourseApi};
use lectern::domain::{
    AuthResponse, Chapter, ChapterId, Content, ContentId, Course, CourseId, MediaKind, User,
};
use lectern::session::{MemoryStorage, Navigator, Route, SessionGuard, SessionStore};

pub const TOKEN: &str = "access-abc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListCourses,
    GetCourse,
    ListChapters,
    ChapterContents,
    Enroll,
    MyEnrollments,
}

#[derive(Default)]
pub struct FakeApi {
    pub courses: Vec<Course>,
    pub chapters: Vec<Chapter>,
    pub contents: HashMap<ChapterId, Vec<Content>>,
    pub enrolled: Mutex<Vec<CourseId>>,
    failures: Mutex<HashMap<Endpoint, (u16, String)>>,
    calls: Mutex<HashMap<Endpoint, usize>>,
    tokens_seen: Mutex<Vec<String>>,
    total: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `endpoint` fail until `recover` is called
    pub fn fail(&self, endpoint: Endpoint, status: u16, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(endpoint, (status, message.to_string()));
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failures.lock().unwrap().remove(&endpoint);
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().unwrap().get(&endpoint).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }

    fn record(&self, endpoint: Endpoint, token: Option<&str>) -> Result<(), ApiError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;
        if let Some(token) = token {
            self.tokens_seen.lock().unwrap().push(token.to_string());
        }

        match self.failures.lock().unwrap().get(&endpoint) {
            Some((status, message)) => Err(ApiError::status(*status, message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CourseApi for FakeApi {
    async fn list_courses(&self, token: Option<&str>) -> Result<Vec<Course>, ApiError> {
        self.record(Endpoint::ListCourses, token)?;
        Ok(self.courses.clone())
    }

    async fn get_course(&self, id: CourseId, token: Option<&str>) -> Result<Course, ApiError> {
        self.record(Endpoint::GetCourse, token)?;
        self.courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "Course not found"))
    }

    async fn list_chapters(
        &self,
        course_id: CourseId,
        token: Option<&str>,
    ) -> Result<Vec<Chapter>, ApiError> {
        self.record(Endpoint::ListChapters, token)?;
        Ok(self
            .chapters
            .iter()
            .filter(|c| c.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn chapter_contents(
        &self,
        chapter_id: ChapterId,
        token: Option<&str>,
    ) -> Result<Chapter, ApiError> {
        self.record(Endpoint::ChapterContents, token)?;
        let mut chapter = self
            .chapters
            .iter()
            .find(|c| c.id == chapter_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "Chapter not found"))?;
        chapter.contents = Some(self.contents.get(&chapter_id).cloned().unwrap_or_default());
        Ok(chapter)
    }

    async fn enroll(&self, course_id: CourseId, token: &str) -> Result<(), ApiError> {
        self.record(Endpoint::Enroll, Some(token))?;
        self.enrolled.lock().unwrap().push(course_id);
        Ok(())
    }

    async fn my_enrollments(&self, token: &str) -> Result<Vec<CourseId>, ApiError> {
        self.record(Endpoint::MyEnrollments, Some(token))?;
        Ok(self.enrolled.lock().unwrap().clone())
    }
}

/// Navigator that remembers every redirect
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes.lock().unwrap().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// Guard over in-memory storage, plus handles to inspect both sides
pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub guard: SessionGuard,
}

impl Harness {
    /// Nothing stored
    pub fn signed_out() -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let guard = SessionGuard::new(SessionStore::new(storage.clone()), navigator.clone());
        Self {
            storage,
            navigator,
            guard,
        }
    }

    /// Signed in as a student
    pub fn signed_in() -> Self {
        let harness = Self::signed_out();
        harness
            .guard
            .store()
            .save(&AuthResponse {
                access_token: TOKEN.to_string(),
                refresh_token: "refresh-xyz".to_string(),
                user: user("student"),
            })
            .unwrap();
        harness
    }
}

pub fn user(role: &str) -> User {
    User {
        id: 42,
        name: "Rina Wijaya".to_string(),
        email: "rina@example.com".to_string(),
        role: role.to_string(),
        is_active: true,
    }
}

pub fn course(id: i64, name: &str) -> Course {
    let stamp = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    Course {
        id: CourseId(id),
        name: name.to_string(),
        description: String::new(),
        created_at: stamp,
        updated_at: stamp,
    }
}

pub fn chapter(id: i64, course_id: i64, order: i32) -> Chapter {
    Chapter {
        id: ChapterId(id),
        course_id: CourseId(course_id),
        title: format!("Chapter {}", id),
        description: None,
        order,
        published: true,
        contents: None,
    }
}

pub fn content(id: i64, chapter_id: i64, order: i32, kind: MediaKind, url: Option<&str>) -> Content {
    Content {
        id: ContentId(id),
        chapter_id: ChapterId(chapter_id),
        title: format!("Item {}", id),
        description: None,
        kind,
        url: url.map(str::to_string),
        body: None,
        order,
        published: true,
        duration_minutes: None,
    }
}
