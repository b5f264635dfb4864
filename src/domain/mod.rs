//! Domain types for the course catalog client.
//!
//! This module contains the core data structures:
//! - Course hierarchy: Course, Chapter, Content
//! - Identity: User, login/registration payloads

pub mod course;
pub mod user;

// Re-export commonly used types
pub use course::{
    sort_by_order, Chapter, ChapterId, Content, ContentId, Course, CourseId, MediaKind,
};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, User, ADMIN_ROLE};
