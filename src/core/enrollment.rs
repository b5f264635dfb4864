//! Enrollment membership for the current user.

use std::collections::HashSet;

use tracing::debug;

use crate::adapters::{ApiError, CourseApi};
use crate::domain::CourseId;

/// Set of course ids the current user is enrolled in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentTracker {
    enrolled: HashSet<CourseId>,
}

impl EnrollmentTracker {
    /// Fetch the full enrollment set
    pub async fn load(api: &dyn CourseApi, token: &str) -> Result<Self, ApiError> {
        let ids = api.my_enrollments(token).await?;
        debug!(count = ids.len(), "Enrollments loaded");
        Ok(Self::from_ids(ids))
    }

    pub fn from_ids(ids: impl IntoIterator<Item = CourseId>) -> Self {
        Self {
            enrolled: ids.into_iter().collect(),
        }
    }

    pub fn is_enrolled(&self, course_id: CourseId) -> bool {
        self.enrolled.contains(&course_id)
    }

    /// Record a successful enroll without refetching
    pub fn mark_enrolled(&mut self, course_id: CourseId) {
        self.enrolled.insert(course_id);
    }

    pub fn len(&self) -> usize {
        self.enrolled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enrolled.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let mut tracker = EnrollmentTracker::from_ids([CourseId(1), CourseId(3)]);
        assert!(tracker.is_enrolled(CourseId(1)));
        assert!(!tracker.is_enrolled(CourseId(7)));

        tracker.mark_enrolled(CourseId(7));
        assert!(tracker.is_enrolled(CourseId(7)));
        assert_eq!(tracker.len(), 3);

        // Idempotent
        tracker.mark_enrolled(CourseId(7));
        assert_eq!(tracker.len(), 3);
    }
}
