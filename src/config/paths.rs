//! Canonical paths for lectern client state.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! | Location | Purpose |
//! |----------|---------|
//! | `$LECTERN_HOME/` | Client state directory |
//! | `$LECTERN_HOME/session.json` | Identity slots (unless `session.file` is set) |

use std::path::{Path, PathBuf};

/// Default session file inside a home directory
pub fn session_file_in(home: &Path) -> PathBuf {
    home.join("session.json")
}
