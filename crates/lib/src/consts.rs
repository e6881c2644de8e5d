//! Crate-wide constants.

/// Application name, used for config directories and the per-project state directory.
pub const APP_NAME: &str = "agentkit";

/// Directory inside a target project holding agentkit's own state.
pub const STATE_DIR: &str = ".agentkit";

/// Tracker document file name within [`STATE_DIR`].
pub const TRACKER_FILENAME: &str = "installed.json";

/// Current tracker document schema version.
pub const TRACKER_VERSION: u32 = 1;

/// Reserved field carrying the owning descriptor name on every entry agentkit
/// writes into a shared JSON document.
pub const OWNER_FIELD: &str = "_agentkit";

/// Matcher value meaning "match everything".
pub const DEFAULT_MATCHER: &str = "*";

/// Suffix used for backups of user-modified files before they are overwritten.
pub const BACKUP_SUFFIX: &str = "bak";
