//! Dashboard: the course catalog with enrollment state.

use tracing::{info, instrument};

use super::enrollment::EnrollmentTracker;
use crate::adapters::CourseApi;
use crate::domain::{Course, CourseId, User};
use crate::session::{ActionError, Route, SessionGuard};

/// Catalog entry as the dashboard shows it
#[derive(Debug, Clone, Copy)]
pub struct CourseEntry<'a> {
    pub course: &'a Course,
    pub enrolled: bool,
}

/// Loaded dashboard state
#[derive(Debug, Clone)]
pub struct Dashboard {
    user: User,
    courses: Vec<Course>,
    enrollments: EnrollmentTracker,
}

impl Dashboard {
    /// Fetch the catalog and the enrollment set concurrently.
    ///
    /// Both must succeed before the dashboard exists; the first failure is
    /// routed through the guard.
    #[instrument(skip_all)]
    pub async fn load(api: &dyn CourseApi, guard: &SessionGuard) -> Result<Self, ActionError> {
        let (token, user) = guard.require_user()?;

        let (courses, enrollments) = tokio::try_join!(
            api.list_courses(Some(&token)),
            EnrollmentTracker::load(api, &token),
        )
        .map_err(|e| guard.intercept(e))?;

        info!(
            courses = courses.len(),
            enrolled = enrollments.len(),
            "Dashboard loaded"
        );

        Ok(Self {
            user,
            courses,
            enrollments,
        })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Courses in catalog order with their enrollment flag
    pub fn courses(&self) -> impl Iterator<Item = CourseEntry<'_>> {
        self.courses.iter().map(|course| CourseEntry {
            course,
            enrolled: self.enrollments.is_enrolled(course.id),
        })
    }

    pub fn enrollments(&self) -> &EnrollmentTracker {
        &self.enrollments
    }

    pub fn is_enrolled(&self, course_id: CourseId) -> bool {
        self.enrollments.is_enrolled(course_id)
    }

    /// Enroll in a course and mark it enrolled without refetching.
    ///
    /// Returns the course page the user should be sent to.
    #[instrument(skip(self, api, guard))]
    pub async fn enroll(
        &mut self,
        api: &dyn CourseApi,
        guard: &SessionGuard,
        course_id: CourseId,
    ) -> Result<Route, ActionError> {
        let token = guard.require_credential()?;
        api.enroll(course_id, &token)
            .await
            .map_err(|e| guard.intercept(e))?;

        self.enrollments.mark_enrolled(course_id);
        info!(course = %course_id, "Enrolled");

        let route = Route::Course(course_id);
        guard.navigate(route);
        Ok(route)
    }
}
