//! Core client logic.
//!
//! This module contains:
//! - EnrollmentTracker: enrolled course ids with optimistic updates
//! - MediaResolver: raw media URL to embeddable descriptor
//! - ContentTree: lazily loaded, single-expansion chapter tree
//! - Dashboard / CourseView: the page controllers wiring them together

pub mod content_tree;
pub mod course_view;
pub mod dashboard;
pub mod enrollment;
pub mod media;

// Re-export commonly used types
pub use content_tree::{ContentTree, Expansion, Toggle};
pub use course_view::{CourseView, Playback};
pub use dashboard::{CourseEntry, Dashboard};
pub use enrollment::EnrollmentTracker;
pub use media::{resolve, MediaDescriptor, MediaResolver, DIRECT_MIME_CANDIDATES};
