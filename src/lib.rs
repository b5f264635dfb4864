//! lectern - course catalog client
//!
//! A Rust client for a course catalog service: browse courses, enroll,
//! and walk a course's chapters and content items.
//!
//! # Architecture
//!
//! Every authenticated view goes through a single session guard:
//! - Missing credentials redirect to sign-in before any request is made
//! - Failures that look like a dead session clear the stored identity
//! - Anything else is surfaced to the caller as a plain message
//!
//! # Modules
//!
//! - `adapters`: HTTP client for the course service
//! - `core`: Enrollment tracking, media resolution, chapter tree, views
//! - `domain`: Data structures (Course, Chapter, Content, User)
//! - `session`: Identity storage and the session guard
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Sign in
//! lectern login --nip 1987654321
//!
//! # Browse and enroll
//! lectern courses
//! lectern enroll 7
//!
//! # Walk a course, expanding chapter 5
//! lectern course 7 --expand 5
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod session;

// Re-export main types at crate root for convenience
pub use self::core::{
    ContentTree, CourseView, Dashboard, EnrollmentTracker, Expansion, MediaDescriptor,
    MediaResolver, Playback, Toggle,
};
pub use adapters::{ApiClient, ApiError, CourseApi};
pub use domain::{Chapter, ChapterId, Content, ContentId, Course, CourseId, MediaKind, User};
pub use session::{ActionError, Navigator, Route, SessionGuard, SessionStore};
