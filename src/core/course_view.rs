//! Course page: details, chapter tree, and opening a content item.

use tracing::{debug, instrument};

use super::content_tree::{ContentTree, Expansion};
use super::media::{self, MediaDescriptor};
use crate::adapters::CourseApi;
use crate::domain::{ChapterId, Content, ContentId, Course, CourseId, MediaKind};
use crate::session::{ActionError, SessionGuard};

/// How an opened content item is presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
    /// Video item; `None` when it has no URL
    Video(Option<MediaDescriptor>),

    /// Inline lesson text
    Text(String),

    /// Anything else is handed to an external viewer
    External { kind: MediaKind, url: Option<String> },
}

impl Playback {
    /// Presentation for a content item; media is resolved for video only
    pub fn for_content(content: &Content) -> Self {
        match content.kind {
            MediaKind::Video => Playback::Video(media::resolve(content.url.as_deref())),
            MediaKind::Text => Playback::Text(content.body.clone().unwrap_or_default()),
            kind => Playback::External {
                kind,
                url: content.url.clone(),
            },
        }
    }
}

/// Loaded course page
#[derive(Debug, Clone)]
pub struct CourseView {
    course: Course,
    tree: ContentTree,
}

impl CourseView {
    /// Fetch the course and its chapter list concurrently
    #[instrument(skip(api, guard))]
    pub async fn open(
        api: &dyn CourseApi,
        guard: &SessionGuard,
        course_id: CourseId,
    ) -> Result<Self, ActionError> {
        let token = guard.require_credential()?;

        let (course, chapters) = tokio::try_join!(
            api.get_course(course_id, Some(&token)),
            api.list_chapters(course_id, Some(&token)),
        )
        .map_err(|e| guard.intercept(e))?;

        Ok(Self {
            course,
            tree: ContentTree::new(course_id, chapters),
        })
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    /// Toggle a chapter, fetching its contents on first expansion
    pub async fn toggle(
        &mut self,
        chapter_id: ChapterId,
        api: &dyn CourseApi,
        guard: &SessionGuard,
    ) -> Result<Expansion, ActionError> {
        self.tree.toggle_and_fetch(chapter_id, api, guard).await
    }

    /// Open a content item from a chapter that has already been expanded
    pub fn open_content(
        &self,
        chapter_id: ChapterId,
        content_id: ContentId,
    ) -> Result<Playback, ActionError> {
        let contents = self.tree.contents(chapter_id).ok_or_else(|| {
            ActionError::Precondition(format!("Chapter {} has not been opened", chapter_id))
        })?;

        let content = contents
            .iter()
            .find(|c| c.id == content_id)
            .ok_or_else(|| {
                ActionError::Precondition(format!(
                    "Content {} is not in chapter {}",
                    content_id, chapter_id
                ))
            })?;

        debug!(content = %content_id, kind = %content.kind, "Opening content");
        Ok(Playback::for_content(content))
    }
}
