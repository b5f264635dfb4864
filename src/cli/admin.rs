//! Administrative CLI subcommands.
//!
//! Thin pass-throughs to the course service's create/update/delete
//! endpoints. The service enforces authorization; the client only turns
//! away non-admin profiles before sending anything.

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use super::{surface, AppContext};
use crate::adapters::{ApiError, ChapterInput, ContentInput, CourseApi, CourseInput};
use crate::domain::{sort_by_order, Chapter, ChapterId, Content, ContentId, CourseId, MediaKind};
use crate::session::{ActionError, Route};

/// Admin subcommands, grouped by record type
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },

    /// Manage chapters
    Chapter {
        #[command(subcommand)]
        action: ChapterAction,
    },

    /// Manage content items
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseAction {
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    Update {
        id: CourseId,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    Delete {
        id: CourseId,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChapterAction {
    /// List a course's chapters in display order
    List {
        #[arg(long)]
        course: CourseId,
    },
    Create {
        #[arg(long)]
        course: CourseId,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Defaults to one past the course's current chapter count
        #[arg(long)]
        order: Option<i32>,

        #[arg(long)]
        published: bool,
    },
    Update {
        id: ChapterId,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        order: i32,

        #[arg(long)]
        published: bool,
    },
    /// Deletes the chapter and everything in it
    Delete {
        id: ChapterId,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContentAction {
    /// List a chapter's content items in display order
    List {
        #[arg(long)]
        chapter: ChapterId,
    },
    Create {
        #[arg(long)]
        chapter: ChapterId,

        #[arg(long)]
        title: String,

        /// video, text, image, pdf, link, audio or document
        #[arg(long, default_value = "video")]
        kind: MediaKind,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        url: String,

        #[arg(long, default_value = "")]
        text: String,

        /// Defaults to one past the chapter's current item count
        #[arg(long)]
        order: Option<i32>,

        #[arg(long)]
        published: bool,

        #[arg(long, default_value = "0")]
        duration: u32,
    },
    Update {
        id: ContentId,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "video")]
        kind: MediaKind,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        url: String,

        #[arg(long, default_value = "")]
        text: String,

        #[arg(long)]
        order: i32,

        #[arg(long)]
        published: bool,

        #[arg(long, default_value = "0")]
        duration: u32,
    },
    Delete {
        id: ContentId,
    },
}

/// Result of an admin subcommand
enum Outcome {
    /// Table rows for a read-only listing
    Listing(Vec<String>),
    /// Confirmation of a mutation
    Applied(String),
}

/// Mutation failures are shown as-is; they never end the session
fn failed(e: ApiError) -> ActionError {
    ActionError::Failed(e.message())
}

/// Credential of an admin profile, or a redirect away from the admin area
fn require_admin(ctx: &AppContext) -> Result<String, ActionError> {
    let (token, user) = ctx.guard.require_user()?;
    if !user.is_admin() {
        ctx.guard.navigate(Route::Dashboard);
        return Err(ActionError::Precondition(
            "Admin access required".to_string(),
        ));
    }
    Ok(token)
}

/// Execute admin subcommands
pub(crate) async fn execute(ctx: &AppContext, command: AdminCommands) -> Result<()> {
    let token = surface(require_admin(ctx))?;

    let done = match command {
        AdminCommands::Course { action } => course(ctx, &token, action).await,
        AdminCommands::Chapter { action } => chapter(ctx, &token, action).await,
        AdminCommands::Content { action } => content(ctx, &token, action).await,
    };

    match surface(done)? {
        Outcome::Listing(lines) if lines.is_empty() => println!("Nothing here yet."),
        Outcome::Listing(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Outcome::Applied(message) => {
            info!(%message, "Admin mutation applied");
            println!("✅ {}", message);
        }
    }
    Ok(())
}

async fn course(
    ctx: &AppContext,
    token: &str,
    action: CourseAction,
) -> Result<Outcome, ActionError> {
    match action {
        CourseAction::Create { name, description } => {
            let input = CourseInput { name, description };
            ctx.api.create_course(&input, token).await.map_err(failed)?;
            Ok(Outcome::Applied(format!("Course \"{}\" created", input.name)))
        }
        CourseAction::Update {
            id,
            name,
            description,
        } => {
            let input = CourseInput { name, description };
            ctx.api
                .update_course(id, &input, token)
                .await
                .map_err(failed)?;
            Ok(Outcome::Applied(format!("Course {} updated", id)))
        }
        CourseAction::Delete { id } => {
            ctx.api.delete_course(id, token).await.map_err(failed)?;
            Ok(Outcome::Applied(format!("Course {} deleted", id)))
        }
    }
}

async fn chapter(
    ctx: &AppContext,
    token: &str,
    action: ChapterAction,
) -> Result<Outcome, ActionError> {
    match action {
        ChapterAction::List { course } => {
            let chapters = ctx
                .api
                .list_chapters(course, Some(token))
                .await
                .map_err(|e| ctx.guard.intercept(e))?;
            Ok(Outcome::Listing(chapter_rows(chapters)))
        }
        ChapterAction::Create {
            course,
            title,
            description,
            order,
            published,
        } => {
            let chapter_order = match order {
                Some(order) => order,
                None => next_order(
                    ctx.api
                        .list_chapters(course, Some(token))
                        .await
                        .map_err(|e| ctx.guard.intercept(e))?
                        .len(),
                ),
            };

            let input = ChapterInput {
                course_id: Some(course),
                title,
                description,
                chapter_order,
                is_published: published,
            };
            ctx.api.create_chapter(&input, token).await.map_err(failed)?;
            Ok(Outcome::Applied(format!(
                "Chapter \"{}\" created at position {}",
                input.title, chapter_order
            )))
        }
        ChapterAction::Update {
            id,
            title,
            description,
            order,
            published,
        } => {
            let input = ChapterInput {
                course_id: None,
                title,
                description,
                chapter_order: order,
                is_published: published,
            };
            ctx.api
                .update_chapter(id, &input, token)
                .await
                .map_err(failed)?;
            Ok(Outcome::Applied(format!("Chapter {} updated", id)))
        }
        ChapterAction::Delete { id } => {
            ctx.api.delete_chapter(id, token).await.map_err(failed)?;
            Ok(Outcome::Applied(format!("Chapter {} deleted", id)))
        }
    }
}

async fn content(
    ctx: &AppContext,
    token: &str,
    action: ContentAction,
) -> Result<Outcome, ActionError> {
    match action {
        ContentAction::List { chapter } => {
            let contents = ctx
                .api
                .list_contents(chapter, Some(token))
                .await
                .map_err(|e| ctx.guard.intercept(e))?;
            Ok(Outcome::Listing(content_rows(contents)))
        }
        ContentAction::Create {
            chapter,
            title,
            kind,
            description,
            url,
            text,
            order,
            published,
            duration,
        } => {
            let content_order = match order {
                Some(order) => order,
                None => next_order(
                    ctx.api
                        .list_contents(chapter, Some(token))
                        .await
                        .map_err(|e| ctx.guard.intercept(e))?
                        .len(),
                ),
            };

            let input = ContentInput {
                chapter_id: Some(chapter),
                title,
                description,
                content_type: kind,
                file_url: url,
                content_text: text,
                content_order,
                is_published: published,
                duration_minutes: Some(duration),
            }
            .normalized();
            ctx.api.create_content(&input, token).await.map_err(failed)?;
            Ok(Outcome::Applied(format!(
                "Content \"{}\" created at position {}",
                input.title, content_order
            )))
        }
        ContentAction::Update {
            id,
            title,
            kind,
            description,
            url,
            text,
            order,
            published,
            duration,
        } => {
            let input = ContentInput {
                chapter_id: None,
                title,
                description,
                content_type: kind,
                file_url: url,
                content_text: text,
                content_order: order,
                is_published: published,
                duration_minutes: Some(duration),
            }
            .normalized();
            ctx.api
                .update_content(id, &input, token)
                .await
                .map_err(failed)?;
            Ok(Outcome::Applied(format!("Content {} updated", id)))
        }
        ContentAction::Delete { id } => {
            ctx.api.delete_content(id, token).await.map_err(failed)?;
            Ok(Outcome::Applied(format!("Content {} deleted", id)))
        }
    }
}

/// Chapter table in display order
fn chapter_rows(mut chapters: Vec<Chapter>) -> Vec<String> {
    if chapters.is_empty() {
        return Vec::new();
    }
    sort_by_order(&mut chapters, |c| c.order);

    let mut rows = vec![
        format!("{:<6} {:<8} {:<10} {:<40}", "ORDER", "ID", "STATUS", "TITLE"),
        "-".repeat(66),
    ];
    rows.extend(chapters.iter().map(|c| {
        let status = if c.published { "published" } else { "draft" };
        format!(
            "{:<6} {:<8} {:<10} {:<40}",
            c.order,
            c.id,
            status,
            super::truncate(&c.title, 37)
        )
    }));
    rows
}

/// Content table in display order
fn content_rows(mut contents: Vec<Content>) -> Vec<String> {
    if contents.is_empty() {
        return Vec::new();
    }
    sort_by_order(&mut contents, |c| c.order);

    let mut rows = vec![
        format!("{:<6} {:<8} {:<10} {:<40}", "ORDER", "ID", "TYPE", "TITLE"),
        "-".repeat(66),
    ];
    rows.extend(contents.iter().map(|c| {
        format!(
            "{:<6} {:<8} {:<10} {:<40}",
            c.order,
            c.id,
            c.kind,
            super::truncate(&c.title, 37)
        )
    }));
    rows
}

/// Position for a new record appended after `existing` siblings
fn next_order(existing: usize) -> i32 {
    i32::try_from(existing).unwrap_or(i32::MAX - 1) + 1
}
