//! Media URL classification.
//!
//! A raw URL is tested against an ordered list of rules; the first rule
//! whose pattern matches produces the descriptor. Anything unmatched is
//! played directly.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// MIME types offered for direct playback, most common first
pub const DIRECT_MIME_CANDIDATES: [&str; 3] = ["video/mp4", "video/webm", "video/ogg"];

/// Classified, directly playable form of a media URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum MediaDescriptor {
    /// 11-character video id
    #[serde(rename = "youtube")]
    YouTube { id: String },

    /// Numeric video id
    Vimeo { id: String },

    /// Original URL, file type unknown
    Direct { url: String },
}

impl MediaDescriptor {
    /// URL to put in the player
    pub fn embed_url(&self) -> String {
        match self {
            MediaDescriptor::YouTube { id } => format!("https://www.youtube.com/embed/{}", id),
            MediaDescriptor::Vimeo { id } => format!("https://player.vimeo.com/video/{}", id),
            MediaDescriptor::Direct { url } => url.clone(),
        }
    }

    /// Whether the URL goes into an iframe rather than a media element
    pub fn is_embedded(&self) -> bool {
        !matches!(self, MediaDescriptor::Direct { .. })
    }

    /// Source types to offer a media element; empty for embeds
    pub fn mime_candidates(&self) -> &'static [&'static str] {
        match self {
            MediaDescriptor::Direct { .. } => &DIRECT_MIME_CANDIDATES,
            _ => &[],
        }
    }
}

impl std::fmt::Display for MediaDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaDescriptor::YouTube { .. } => write!(f, "youtube {}", self.embed_url()),
            MediaDescriptor::Vimeo { .. } => write!(f, "vimeo {}", self.embed_url()),
            MediaDescriptor::Direct { url } => {
                write!(f, "direct {} ({})", url, DIRECT_MIME_CANDIDATES.join(", "))
            }
        }
    }
}

type Extractor = fn(&str) -> MediaDescriptor;

struct Rule {
    name: &'static str,
    pattern: Regex,
    extract: Extractor,
}

/// Ordered rule set for media URLs
pub struct MediaResolver {
    rules: Vec<Rule>,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaResolver {
    /// Build the resolver with the YouTube rule ahead of the Vimeo rule
    pub fn new() -> Self {
        let rules = vec![
            Rule {
                name: "youtube",
                pattern: Regex::new(
                    r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
                )
                .expect("youtube pattern is valid"),
                extract: |id| MediaDescriptor::YouTube { id: id.to_string() },
            },
            Rule {
                name: "vimeo",
                pattern: Regex::new(r"vimeo\.com/(?:video/)?(\d+)")
                    .expect("vimeo pattern is valid"),
                extract: |id| MediaDescriptor::Vimeo { id: id.to_string() },
            },
        ];

        Self { rules }
    }

    /// Classify a URL; empty or absent input means "no media".
    ///
    /// Surrounding whitespace is ignored for matching, but a `Direct`
    /// descriptor carries the URL exactly as given.
    pub fn resolve(&self, url: Option<&str>) -> Option<MediaDescriptor> {
        let url = url?;
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return None;
        }

        for rule in &self.rules {
            if let Some(id) = rule.pattern.captures(trimmed).and_then(|c| c.get(1)) {
                tracing::debug!(rule = rule.name, id = id.as_str(), "Media URL classified");
                return Some((rule.extract)(id.as_str()));
            }
        }

        Some(MediaDescriptor::Direct {
            url: url.to_string(),
        })
    }
}

/// Classify with the shared default resolver
pub fn resolve(url: Option<&str>) -> Option<MediaDescriptor> {
    static RESOLVER: OnceLock<MediaResolver> = OnceLock::new();
    RESOLVER.get_or_init(MediaResolver::new).resolve(url)
}
