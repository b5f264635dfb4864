//! Credential gate and failure classification.
//!
//! Every view asks the guard for a credential before fetching, and hands
//! every failed fetch back to it. A failure classified as session-invalid
//! clears the identity slots and redirects to login; anything else is
//! surfaced as an ordinary, retryable failure.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::store::{SessionStore, StorageError};
use crate::adapters::ApiError;
use crate::domain::{CourseId, User};

/// Substrings that mark an error text as an authentication failure
pub const SESSION_MARKERS: [&str; 3] = ["token", "expired", "invalid"];

/// Navigation targets the client can be sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    Course(CourseId),
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Login => write!(f, "/login"),
            Route::Dashboard => write!(f, "/dashboard"),
            Route::Course(id) => write!(f, "/courses/{}", id),
        }
    }
}

/// Receives redirects
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: Route);
}

/// Outcome of a user action that did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Identity state was cleared and the user sent to login
    #[error("Session is no longer valid")]
    SessionReset,

    /// Ordinary request failure, shown next to the triggering action
    #[error("{0}")]
    Failed(String),

    /// The action could not start; no request was issued
    #[error("{0}")]
    Precondition(String),
}

impl From<StorageError> for ActionError {
    fn from(e: StorageError) -> Self {
        ActionError::Failed(e.to_string())
    }
}

/// How failures are classified as session-invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyPolicy {
    /// Also match `SESSION_MARKERS` in the error text.
    ///
    /// A validation message containing "invalid" trips this, so a rejected
    /// form can log the user out.
    pub text_heuristic: bool,
}

impl Default for ClassifyPolicy {
    fn default() -> Self {
        Self {
            text_heuristic: true,
        }
    }
}

/// Classification of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SessionInvalid,
    Ordinary,
}

impl ClassifyPolicy {
    /// 401/403 always invalidate the session; the text heuristic is optional
    pub fn classify(&self, status: Option<u16>, message: &str) -> FailureKind {
        if matches!(status, Some(401) | Some(403)) {
            return FailureKind::SessionInvalid;
        }

        if self.text_heuristic && mentions_session(message) {
            return FailureKind::SessionInvalid;
        }

        FailureKind::Ordinary
    }
}

/// Case-insensitive match against `SESSION_MARKERS`
pub fn mentions_session(message: &str) -> bool {
    let lower = message.to_lowercase();
    SESSION_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Gate in front of every authenticated view
#[derive(Clone)]
pub struct SessionGuard {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    policy: ClassifyPolicy,
}

impl SessionGuard {
    pub fn new(store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            policy: ClassifyPolicy::default(),
        }
    }

    /// Replace the classification policy
    pub fn with_policy(mut self, policy: ClassifyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn policy(&self) -> ClassifyPolicy {
        self.policy
    }

    /// Access credential, or a redirect to login when none is stored
    pub fn require_credential(&self) -> Result<String, ActionError> {
        match self.store.access_token()? {
            Some(token) => Ok(token),
            None => {
                info!("No stored credential, redirecting to login");
                self.navigator.redirect(Route::Login);
                Err(ActionError::SessionReset)
            }
        }
    }

    /// Credential plus a readable profile, as the dashboard needs
    pub fn require_user(&self) -> Result<(String, User), ActionError> {
        let token = self.require_credential()?;
        match self.store.user()? {
            Some(user) => Ok((token, user)),
            None => {
                info!("Stored profile missing or unreadable, redirecting to login");
                self.navigator.redirect(Route::Login);
                Err(ActionError::SessionReset)
            }
        }
    }

    /// Classify a failed fetch and apply its side effect.
    ///
    /// Only service answers are classified; transport and decode failures
    /// are always ordinary.
    pub fn intercept(&self, error: ApiError) -> ActionError {
        let message = error.message();
        let kind = match &error {
            ApiError::Status { status, .. } => self.policy.classify(Some(*status), &message),
            ApiError::Transport(_) | ApiError::Decode { .. } => FailureKind::Ordinary,
        };

        match kind {
            FailureKind::SessionInvalid => {
                warn!(%message, "Session rejected, clearing stored identity");
                self.reset(Route::Login);
                ActionError::SessionReset
            }
            FailureKind::Ordinary => ActionError::Failed(message),
        }
    }

    /// Explicit sign-out
    pub fn logout(&self) -> Result<(), ActionError> {
        self.store.clear()?;
        self.navigator.redirect(Route::Home);
        Ok(())
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.redirect(route);
    }

    fn reset(&self, route: Route) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored identity");
        }
        self.navigator.redirect(route);
    }
}
