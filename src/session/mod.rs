//! Session state and the guard that gates every authenticated view.

pub mod guard;
pub mod store;

pub use guard::{
    mentions_session, ActionError, ClassifyPolicy, FailureKind, Navigator, Route, SessionGuard,
    SESSION_MARKERS,
};
pub use store::{
    FileStorage, MemoryStorage, Session, SessionStore, Storage, StorageError, ACCESS_TOKEN_KEY,
    IDENTITY_KEYS, REFRESH_TOKEN_KEY, USER_KEY,
};
