//! Lazily loaded chapter tree for one course.
//!
//! At most one chapter is expanded at a time. A chapter's contents are
//! fetched the first time it is expanded and cached on the chapter record
//! for the life of the tree; collapsing or expanding another chapter never
//! evicts them.
//!
//! The state machine itself does no I/O: `toggle` reports whether the
//! newly expanded chapter still needs its contents and `attach` fills the
//! cache. `toggle_and_fetch` wires the two together through a `CourseApi`.
//! Fetches are not deduplicated; while a chapter is uncached every entry
//! into its expanded state asks for a fetch, and only the first response
//! to arrive is kept.

use tracing::{debug, info, instrument};

use crate::adapters::CourseApi;
use crate::domain::{sort_by_order, Chapter, ChapterId, Content, CourseId};
use crate::session::{ActionError, SessionGuard};

/// Chapter visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    #[default]
    AllCollapsed,
    ChapterExpanded(ChapterId),
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The chapter was open and is now closed
    Collapsed,

    /// The chapter is now the open one
    Expanded {
        chapter_id: ChapterId,
        /// Contents were never fetched; call `attach` with the response
        needs_fetch: bool,
    },
}

/// Ordered chapters of a course plus the accordion state
#[derive(Debug, Clone)]
pub struct ContentTree {
    course_id: CourseId,
    chapters: Vec<Chapter>,
    expansion: Expansion,
}

impl ContentTree {
    /// Build a tree from chapters in any order
    pub fn new(course_id: CourseId, mut chapters: Vec<Chapter>) -> Self {
        sort_by_order(&mut chapters, |c| c.order);
        for chapter in &mut chapters {
            if let Some(contents) = chapter.contents.as_mut() {
                sort_by_order(contents, |c| c.order);
            }
        }

        Self {
            course_id,
            chapters,
            expansion: Expansion::AllCollapsed,
        }
    }

    /// Fetch the chapter list of a course
    #[instrument(skip(api, guard))]
    pub async fn load(
        api: &dyn CourseApi,
        guard: &SessionGuard,
        course_id: CourseId,
    ) -> Result<Self, ActionError> {
        let token = guard.require_credential()?;
        let chapters = api
            .list_chapters(course_id, Some(&token))
            .await
            .map_err(|e| guard.intercept(e))?;

        info!(count = chapters.len(), "Chapters loaded");
        Ok(Self::new(course_id, chapters))
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    /// Chapters sorted ascending by `order`
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn expansion(&self) -> Expansion {
        self.expansion
    }

    /// The open chapter, if any
    pub fn expanded_chapter(&self) -> Option<&Chapter> {
        match self.expansion {
            Expansion::AllCollapsed => None,
            Expansion::ChapterExpanded(id) => self.chapter(id),
        }
    }

    /// Cached contents of a chapter, sorted ascending by `order`
    pub fn contents(&self, id: ChapterId) -> Option<&[Content]> {
        self.chapter(id)?.contents.as_deref()
    }

    pub fn is_cached(&self, id: ChapterId) -> bool {
        self.chapter(id).map(Chapter::is_loaded).unwrap_or(false)
    }

    /// Flip a chapter open or closed; opening it closes any other
    pub fn toggle(&mut self, id: ChapterId) -> Result<Toggle, ActionError> {
        let Some(chapter) = self.chapter(id) else {
            return Err(ActionError::Precondition(format!(
                "Chapter {} is not part of course {}",
                id, self.course_id
            )));
        };
        let needs_fetch = !chapter.is_loaded();

        if self.expansion == Expansion::ChapterExpanded(id) {
            self.expansion = Expansion::AllCollapsed;
            debug!(chapter = %id, "Chapter collapsed");
            return Ok(Toggle::Collapsed);
        }

        self.expansion = Expansion::ChapterExpanded(id);
        debug!(chapter = %id, needs_fetch, "Chapter expanded");
        Ok(Toggle::Expanded {
            chapter_id: id,
            needs_fetch,
        })
    }

    /// Fill a chapter's cache.
    ///
    /// Returns `false` when the chapter is unknown or already cached; the
    /// first successful fill is the one that sticks.
    pub fn attach(&mut self, id: ChapterId, mut contents: Vec<Content>) -> bool {
        let Some(chapter) = self.chapters.iter_mut().find(|c| c.id == id) else {
            debug!(chapter = %id, "Dropping contents for unknown chapter");
            return false;
        };
        if chapter.is_loaded() {
            debug!(chapter = %id, "Chapter already cached, ignoring late contents");
            return false;
        }

        sort_by_order(&mut contents, |c| c.order);
        chapter.contents = Some(contents);
        true
    }

    /// Toggle a chapter and, when it opens uncached, fetch its contents.
    ///
    /// A failed fetch leaves the chapter open and uncached, so toggling it
    /// again retries.
    #[instrument(skip(self, api, guard), fields(course = %self.course_id))]
    pub async fn toggle_and_fetch(
        &mut self,
        id: ChapterId,
        api: &dyn CourseApi,
        guard: &SessionGuard,
    ) -> Result<Expansion, ActionError> {
        if let Toggle::Expanded {
            needs_fetch: true, ..
        } = self.toggle(id)?
        {
            let token = guard.require_credential()?;
            let fetched = api
                .chapter_contents(id, Some(&token))
                .await
                .map_err(|e| guard.intercept(e))?;

            let contents = fetched.contents.unwrap_or_default();
            info!(chapter = %id, count = contents.len(), "Chapter contents fetched");
            self.attach(id, contents);
        }

        Ok(self.expansion)
    }
}
