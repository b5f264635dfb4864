//! Command-line interface for lectern.
//!
//! Provides commands for signing in, browsing the catalog, enrolling,
//! walking a course's chapter tree, opening content, and the
//! administrative pass-through mutations.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::ApiClient;
use crate::config::{self, ResolvedConfig};
use crate::core::{media, CourseView, Dashboard, Expansion, MediaDescriptor, Playback};
use crate::domain::{ChapterId, ContentId, CourseId, LoginRequest, RegisterRequest};
use crate::session::{ActionError, FileStorage, Navigator, Route, SessionGuard, SessionStore};

pub mod admin;

/// lectern - course catalog client
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Employee/student number
        #[arg(long)]
        nip: String,

        #[arg(long, env = "LECTERN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and store the session
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        nip: String,

        #[arg(long, env = "LECTERN_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, default_value = "student")]
        role: String,
    },

    /// Clear the stored session
    Logout,

    /// Show the stored profile
    Whoami,

    /// List the catalog with enrollment state
    Courses,

    /// Enroll in a course
    Enroll {
        /// Course ID
        course_id: CourseId,
    },

    /// Show a course and its chapter tree
    Course {
        /// Course ID
        course_id: CourseId,

        /// Chapters to toggle, in order (repeatable)
        #[arg(short, long)]
        expand: Vec<ChapterId>,
    },

    /// Open a content item
    Open {
        /// Course ID
        course_id: CourseId,

        /// Chapter containing the item
        chapter_id: ChapterId,

        /// Content ID
        content_id: ContentId,
    },

    /// Classify a media URL
    Resolve {
        /// Raw media URL
        url: String,
    },

    /// Show resolved configuration (debug)
    Config,

    /// Administrative course/chapter/content mutations
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },
}

/// Redirects rendered as hints on stderr
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, route: Route) {
        match route {
            Route::Login => eprintln!("→ Please sign in: lectern login --nip <NIP>"),
            Route::Home => eprintln!("→ Signed out."),
            Route::Dashboard => eprintln!("→ See available courses: lectern courses"),
            Route::Course(id) => eprintln!("→ Open the course: lectern course {}", id),
        }
    }
}

/// Client, session guard and settings for one invocation
pub(crate) struct AppContext {
    pub(crate) api: ApiClient,
    pub(crate) guard: SessionGuard,
}

impl AppContext {
    fn from_config(cfg: &ResolvedConfig) -> Result<Self> {
        let api = ApiClient::with_timeout(&cfg.api.base_url, cfg.api.timeout())
            .context("Failed to build HTTP client")?;
        let store = SessionStore::new(Arc::new(FileStorage::new(&cfg.session.file)));
        let guard =
            SessionGuard::new(store, Arc::new(TerminalNavigator)).with_policy(cfg.session.policy());

        Ok(Self { api, guard })
    }
}

/// Turn a failed user action into a CLI error
pub(crate) fn surface<T>(result: Result<T, ActionError>) -> Result<T> {
    result.map_err(|e| match e {
        ActionError::SessionReset => anyhow::anyhow!("Not signed in"),
        ActionError::Failed(message) | ActionError::Precondition(message) => {
            anyhow::anyhow!(message)
        }
    })
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;

        // Commands that never touch the service
        match &self.command {
            Commands::Resolve { url } => return resolve_url(url),
            Commands::Config => return show_config(cfg),
            _ => {}
        }

        let ctx = AppContext::from_config(cfg)?;

        match self.command {
            Commands::Login { nip, password } => login(&ctx, nip, password).await,
            Commands::Register {
                name,
                email,
                nip,
                password,
                role,
            } => {
                register(
                    &ctx,
                    RegisterRequest {
                        name,
                        email,
                        nip,
                        password,
                        role,
                    },
                )
                .await
            }
            Commands::Logout => surface(ctx.guard.logout()),
            Commands::Whoami => whoami(&ctx),
            Commands::Courses => list_courses(&ctx).await,
            Commands::Enroll { course_id } => enroll(&ctx, course_id).await,
            Commands::Course { course_id, expand } => show_course(&ctx, course_id, expand).await,
            Commands::Open {
                course_id,
                chapter_id,
                content_id,
            } => open_content(&ctx, course_id, chapter_id, content_id).await,
            Commands::Admin { command } => admin::execute(&ctx, command).await,
            Commands::Resolve { .. } | Commands::Config => Ok(()),
        }
    }
}

/// Sign in and persist the three identity slots
async fn login(ctx: &AppContext, nip: String, password: String) -> Result<()> {
    let auth = ctx
        .api
        .login(&LoginRequest { nip, password })
        .await
        .map_err(|e| anyhow::anyhow!(e.message()))?;

    ctx.guard
        .store()
        .save(&auth)
        .context("Failed to store session")?;

    eprintln!("✅ Signed in as {} ({})", auth.user.name, auth.user.role);
    ctx.guard.navigate(Route::Dashboard);
    Ok(())
}

async fn register(ctx: &AppContext, request: RegisterRequest) -> Result<()> {
    let auth = ctx
        .api
        .register(&request)
        .await
        .map_err(|e| anyhow::anyhow!(e.message()))?;

    ctx.guard
        .store()
        .save(&auth)
        .context("Failed to store session")?;

    eprintln!("✅ Registered {} ({})", auth.user.name, auth.user.email);
    ctx.guard.navigate(Route::Dashboard);
    Ok(())
}

fn whoami(ctx: &AppContext) -> Result<()> {
    let (_, user) = surface(ctx.guard.require_user())?;

    println!("Name:   {}", user.name);
    println!("Email:  {}", user.email);
    println!("Role:   {}", user.role);
    println!(
        "Status: {}",
        if user.is_active { "Active" } else { "Inactive" }
    );
    Ok(())
}

/// List the catalog with enrollment markers
async fn list_courses(ctx: &AppContext) -> Result<()> {
    let dashboard = surface(Dashboard::load(&ctx.api, &ctx.guard).await)?;

    eprintln!("Welcome back, {}", dashboard.user().name);
    if dashboard.is_admin() {
        eprintln!("(admin: see `lectern admin --help`)");
    }

    let entries: Vec<_> = dashboard.courses().collect();
    if entries.is_empty() {
        println!("No courses available.");
        return Ok(());
    }

    println!("{:<8} {:<10} {:<50}", "ID", "STATUS", "NAME");
    println!("{}", "-".repeat(70));

    for entry in entries {
        let status = if entry.enrolled { "enrolled" } else { "-" };
        println!(
            "{:<8} {:<10} {:<50}",
            entry.course.id,
            status,
            truncate(&entry.course.name, 47)
        );
    }

    Ok(())
}

async fn enroll(ctx: &AppContext, course_id: CourseId) -> Result<()> {
    let mut dashboard = surface(Dashboard::load(&ctx.api, &ctx.guard).await)?;

    if dashboard.is_enrolled(course_id) {
        println!("Already enrolled in course {}", course_id);
        ctx.guard.navigate(Route::Course(course_id));
        return Ok(());
    }

    surface(dashboard.enroll(&ctx.api, &ctx.guard, course_id).await)?;
    println!("✅ Successfully enrolled in course {}", course_id);
    Ok(())
}

/// Show course details and the chapter tree after the requested toggles
async fn show_course(ctx: &AppContext, course_id: CourseId, expand: Vec<ChapterId>) -> Result<()> {
    let mut view = surface(CourseView::open(&ctx.api, &ctx.guard, course_id).await)?;

    for chapter_id in expand {
        surface(view.toggle(chapter_id, &ctx.api, &ctx.guard).await)?;
    }

    let course = view.course();
    println!("{}", course.name);
    println!("{}", "=".repeat(course.name.chars().count().max(8)));
    if !course.description.is_empty() {
        println!("{}", course.description);
    }
    println!();
    println!("Created:      {}", course.created_at.format("%Y-%m-%d"));
    println!("Last updated: {}", course.updated_at.format("%Y-%m-%d"));
    println!();

    let tree = view.tree();
    if tree.chapters().is_empty() {
        println!("No chapters yet.");
        return Ok(());
    }

    for chapter in tree.chapters() {
        let open = tree.expansion() == Expansion::ChapterExpanded(chapter.id);
        let marker = if open { "▾" } else { "▸" };
        let draft = if chapter.published { "" } else { " [draft]" };
        println!(
            "{} {:>3}. {} (#{}){}",
            marker, chapter.order, chapter.title, chapter.id, draft
        );

        if !open {
            continue;
        }

        match chapter.contents.as_deref() {
            Some([]) | None => println!("      (no content)"),
            Some(contents) => {
                for content in contents {
                    let duration = content
                        .duration_minutes
                        .map(|m| format!(" · {} min", m))
                        .unwrap_or_default();
                    println!(
                        "      {:>3}. [{}] {} (#{}){}",
                        content.order, content.kind, content.title, content.id, duration
                    );
                }
            }
        }
    }

    Ok(())
}

async fn open_content(
    ctx: &AppContext,
    course_id: CourseId,
    chapter_id: ChapterId,
    content_id: ContentId,
) -> Result<()> {
    let mut view = surface(CourseView::open(&ctx.api, &ctx.guard, course_id).await)?;
    surface(view.toggle(chapter_id, &ctx.api, &ctx.guard).await)?;

    match surface(view.open_content(chapter_id, content_id))? {
        Playback::Video(Some(descriptor)) => print_descriptor(&descriptor),
        Playback::Video(None) => println!("No media attached to this video."),
        Playback::Text(body) => println!("{}", body),
        Playback::External { kind, url } => match url {
            Some(url) => println!("{}: {}", kind, url),
            None => println!("{}: (no URL)", kind),
        },
    }

    Ok(())
}

fn resolve_url(url: &str) -> Result<()> {
    match media::resolve(Some(url)) {
        Some(descriptor) => print_descriptor(&descriptor),
        None => println!("No media"),
    }
    Ok(())
}

fn print_descriptor(descriptor: &MediaDescriptor) {
    println!("{}", serde_json::to_string_pretty(descriptor).unwrap_or_default());
    println!("Embed: {}", descriptor.embed_url());
    if !descriptor.mime_candidates().is_empty() {
        println!("Types: {}", descriptor.mime_candidates().join(", "));
    }
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("lectern configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:         {}", cfg.home.display());
    println!("  Session file: {}", cfg.session.file.display());
    println!();
    println!("API:");
    println!("  Base URL: {}", cfg.api.base_url);
    println!("  Timeout:  {}s", cfg.api.timeout_seconds);
    println!();
    println!("Session:");
    println!("  Text heuristic: {}", cfg.session.text_heuristic);

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_surface_messages() {
        let err = surface::<()>(Err(ActionError::Failed("Course not found".to_string())))
            .unwrap_err();
        assert_eq!(err.to_string(), "Course not found");

        let err = surface::<()>(Err(ActionError::SessionReset)).unwrap_err();
        assert_eq!(err.to_string(), "Not signed in");
    }

    #[test]
    fn test_cli_parses_expand_list() {
        let cli = Cli::parse_from(["lectern", "course", "7", "-e", "2", "--expand", "5"]);
        match cli.command {
            Commands::Course { course_id, expand } => {
                assert_eq!(course_id, CourseId(7));
                assert_eq!(expand, vec![ChapterId(2), ChapterId(5)]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
