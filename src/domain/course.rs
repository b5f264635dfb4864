//! Course hierarchy records: Course → Chapter → Content.
//!
//! Field names follow the wire format of the course service; the Rust
//! names are the ones the rest of the crate reasons about (`order`,
//! `published`, `kind`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw integer value
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

id_type!(
    /// Course identifier
    CourseId
);
id_type!(
    /// Chapter identifier
    ChapterId
);
id_type!(
    /// Content item identifier
    ContentId
);

/// Root of the hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ordered subdivision of a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Display sort key; uniqueness is not enforced client-side
    #[serde(rename = "chapter_order")]
    pub order: i32,

    #[serde(rename = "is_published", default)]
    pub published: bool,

    /// `None` until fetched; `Some(vec![])` once fetched and empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<Content>>,
}

impl Chapter {
    /// Whether the content list has been fetched
    pub fn is_loaded(&self) -> bool {
        self.contents.is_some()
    }
}

/// A single typed learning asset bound to a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: ContentId,
    pub chapter_id: ChapterId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "content_type")]
    pub kind: MediaKind,

    /// External media location
    #[serde(rename = "file_url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Inline lesson text
    #[serde(rename = "content_text", default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(rename = "content_order")]
    pub order: i32,

    #[serde(rename = "is_published", default)]
    pub published: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Kind of media a content item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Text,
    Image,
    Pdf,
    Link,
    Audio,
    Document,
}

impl MediaKind {
    /// All kinds, in the order the service lists them
    pub const ALL: [MediaKind; 7] = [
        MediaKind::Video,
        MediaKind::Text,
        MediaKind::Image,
        MediaKind::Pdf,
        MediaKind::Link,
        MediaKind::Audio,
        MediaKind::Document,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Text => "text",
            MediaKind::Image => "image",
            MediaKind::Pdf => "pdf",
            MediaKind::Link => "link",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let lower = s.trim().to_lowercase();
        MediaKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| anyhow::anyhow!("Unknown content type: {}", s))
    }
}

/// A `null` string field reads as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sort records ascending by their display order.
///
/// The sort is stable, so records sharing an order value keep the order
/// the service returned them in.
pub fn sort_by_order<T>(items: &mut [T], order: impl Fn(&T) -> i32) {
    items.sort_by_key(|item| order(item));
}
